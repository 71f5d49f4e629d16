pub mod external;
pub mod language;
pub mod presets;
pub mod resolver;
pub mod selection;

pub use external::{ExternalSubtitle, SubtitleFormat, SubtitleMenuEntry};
pub use presets::{AutoSelection, auto_select_tracks};
pub use resolver::{resolve, resolve_all, resolve_current, resolve_index};
pub use selection::{
    SelectionPreference, TrackChoice, TrackPreferences, select_audio, select_subtitle,
};

use crate::engine::DISABLED_INDEX;
use language::UNKNOWN_LANGUAGE;
use serde::{Deserialize, Serialize};

/// Label used for the disabled sentinel track
pub const DISABLED_LABEL: &str = "Disabled";

/// Track information as presented to the host (`TrackInfo` on the wire)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTrack {
    pub id: String,
    pub language: String,
    pub label: String,
}

pub type TrackInfo = ResolvedTrack;

impl ResolvedTrack {
    /// The "no track" entry
    pub fn disabled() -> Self {
        Self {
            id: DISABLED_INDEX.to_string(),
            language: String::new(),
            label: DISABLED_LABEL.to_string(),
        }
    }

    /// Stand-in for an index the engine no longer lists
    pub fn placeholder(index: i32) -> Self {
        Self {
            id: index.to_string(),
            language: UNKNOWN_LANGUAGE.to_string(),
            label: "Unknown".to_string(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.id == DISABLED_INDEX.to_string()
    }

    /// Native index this track was resolved from
    pub fn index(&self) -> Option<i32> {
        self.id.parse().ok()
    }

    /// Label prefixed with a flag for the track language
    pub fn display_name(&self) -> String {
        display_label(&self.language, &self.label)
    }
}

/// Track as listed to the host, with its menu label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayTrack {
    #[serde(flatten)]
    pub track: ResolvedTrack,
    pub display_name: String,
}

impl From<ResolvedTrack> for DisplayTrack {
    fn from(track: ResolvedTrack) -> Self {
        let display_name = track.display_name();
        Self {
            track,
            display_name,
        }
    }
}

/// `label` prefixed with the flag (or `[XX]` tag) of `language`
pub fn display_label(language: &str, label: &str) -> String {
    if language.is_empty() || language == UNKNOWN_LANGUAGE {
        return label.to_string();
    }
    match flag_for_language(language) {
        Some(flag) => format!("{} {}", flag, label),
        None => format!("[{}] {}", language.to_uppercase(), label),
    }
}

/// Country used for the flag of a language code
fn country_for_language(code: &str) -> Option<String> {
    let code = code.to_lowercase();
    let mapped = match code.as_str() {
        "en" | "eng" => Some("GB"),
        "fr" | "fra" | "fre" => Some("FR"),
        "de" | "deu" | "ger" => Some("DE"),
        "it" | "ita" => Some("IT"),
        "es" | "spa" => Some("ES"),
        "ja" | "jpn" => Some("JP"),
        "ko" | "kor" => Some("KR"),
        "zh" | "zho" | "chi" => Some("CN"),
        "ru" | "rus" => Some("RU"),
        "ar" | "ara" => Some("SA"),
        "pt" | "por" => Some("PT"),
        "nl" | "nld" | "dut" => Some("NL"),
        "sv" | "swe" => Some("SE"),
        "hi" | "hin" => Some("IN"),
        _ => None,
    };
    if let Some(country) = mapped {
        return Some(country.to_string());
    }
    if code.len() >= 2 && code.chars().take(2).all(|c| c.is_ascii_alphabetic()) {
        return Some(code[..2].to_uppercase());
    }
    None
}

/// Regional indicator pair for a two-letter country code
fn flag_for_language(code: &str) -> Option<String> {
    let country = country_for_language(code)?;
    country
        .chars()
        .map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32)))
        .collect()
}
