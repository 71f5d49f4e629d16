use crate::error::AppError;
use serde::Serialize;
use serde_json::Value;

/// Reply to every bridge command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResult {
    pub result: bool,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PlayerResult {
    pub fn ok(method: &str, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Self {
                result: true,
                method: method.to_string(),
                value: Some(value),
                message: None,
            },
            Err(e) => Self::failure(method, AppError::from(e)),
        }
    }

    pub fn failure(method: &str, error: AppError) -> Self {
        Self {
            result: false,
            method: method.to_string(),
            value: None,
            message: Some(error.to_string()),
        }
    }

    pub fn from_result<T: Serialize>(method: &str, result: Result<T, AppError>) -> Self {
        match result {
            Ok(value) => Self::ok(method, value),
            Err(e) => Self::failure(method, e),
        }
    }

    pub fn value_f64(&self) -> Option<f64> {
        self.value.as_ref().and_then(Value::as_f64)
    }

    pub fn value_bool(&self) -> Option<bool> {
        self.value.as_ref().and_then(Value::as_bool)
    }
}
