use crate::config::TrackDefaultsConfig;
use crate::error::{AppError, Result};
use crate::tracks::{ExternalSubtitle, SelectionPreference, TrackPreferences};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PLAYER_ID: &str = "default";

/// Highest playback rate accepted from the host
pub const MAX_RATE: f64 = 4.0;

/// Options accepted by `initPlayer`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerOptions {
    pub player_id: Option<String>,
    pub url: Option<String>,
    pub subtitles: Vec<ExternalSubtitle>,
    /// Audio fallback locale
    pub preferred_locale: Option<String>,
    pub subtitle_track_id: Option<String>,
    pub subtitle_locale: Option<String>,
    pub audio_track_id: Option<String>,
    pub audio_locale: Option<String>,
    pub rate: Option<f64>,
    pub exit_on_end: Option<bool>,
    pub loop_on_end: Option<bool>,
    pub start_at_sec: Option<f64>,
}

impl PlayerOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn player_id(&self) -> &str {
        self.player_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(DEFAULT_PLAYER_ID)
    }

    /// Check everything that must hold before an engine is created
    pub fn validate(&self) -> Result<&str> {
        let url = self.url.as_deref().map(str::trim).unwrap_or_default();
        if url.is_empty() {
            return Err(AppError::InvalidOptions("Must provide a Video Url".to_string()));
        }
        if !is_supported_url(url) {
            return Err(AppError::InvalidOptions(format!(
                "Unsupported video url {:?}: expected http, https, file or an absolute path",
                url
            )));
        }

        if let Some(rate) = self.rate {
            validate_rate(rate)?;
        }
        if let Some(start) = self.start_at_sec
            && !(start.is_finite() && start >= 0.0)
        {
            return Err(AppError::InvalidOptions(
                "startAtSec must be a positive number".to_string(),
            ));
        }
        if let Some(sub) = self.subtitles.iter().find(|s| s.url.trim().is_empty()) {
            return Err(AppError::InvalidOptions(format!(
                "Subtitle {:?} must have a url",
                sub.name.as_deref().unwrap_or("")
            )));
        }
        Ok(url)
    }

    /// Selection preferences for the session
    pub fn preferences(&self, defaults: &TrackDefaultsConfig) -> TrackPreferences {
        let fallback = self
            .preferred_locale
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .or(defaults.preferred_locale.as_deref());

        TrackPreferences {
            audio: SelectionPreference::new(
                self.audio_track_id.as_deref(),
                self.audio_locale.as_deref(),
                fallback,
            ),
            subtitle: SelectionPreference::new(
                self.subtitle_track_id.as_deref(),
                self.subtitle_locale.as_deref(),
                None,
            ),
        }
    }
}

pub fn validate_rate(rate: f64) -> Result<f64> {
    if rate.is_finite() && rate > 0.0 && rate <= MAX_RATE {
        Ok(rate)
    } else {
        Err(AppError::InvalidOptions(format!(
            "Rate must be greater than 0 and at most {}",
            MAX_RATE
        )))
    }
}

fn is_supported_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    let with_host = ["http://", "https://"]
        .iter()
        .any(|scheme| lower.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
    with_host || lower.starts_with("file://") || url.starts_with('/')
}
