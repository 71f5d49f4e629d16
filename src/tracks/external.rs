//! Out-of-band subtitle files supplied by the host

use super::language::UNKNOWN_LANGUAGE;
use super::{display_label, resolve_all};
use crate::engine::{MediaEngine, RawTrack, TrackKind};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Subtitle file formats recognised from the url
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    Ssa,
    WebVtt,
    Ttml,
    SubRip,
}

impl SubtitleFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            SubtitleFormat::Ssa => "text/x-ssa",
            SubtitleFormat::WebVtt => "text/vtt",
            SubtitleFormat::Ttml => "application/ttml+xml",
            SubtitleFormat::SubRip => "application/x-subrip",
        }
    }

    /// Detect the format from the url path, defaulting to SubRip
    pub fn from_url(url: &str) -> Self {
        let path = url_path(url).to_lowercase();
        let path = path.trim_end_matches('/');
        let full = url.to_lowercase();

        let has = |ext: &str| {
            path.ends_with(&format!(".{}", ext)) || full.contains(&format!("/sub.{}", ext))
        };

        if has("ssa") || has("ass") {
            SubtitleFormat::Ssa
        } else if has("vtt") {
            SubtitleFormat::WebVtt
        } else if has("ttml") || has("xml") || has("dfxp") {
            SubtitleFormat::Ttml
        } else {
            SubtitleFormat::SubRip
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSubtitle {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
}

impl ExternalSubtitle {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
            lang: None,
        }
    }

    pub fn format(&self) -> SubtitleFormat {
        SubtitleFormat::from_url(&self.url)
    }

    /// Given language, else one embedded in a `name.<lang>.srt` file name
    pub fn language(&self) -> Option<String> {
        self.lang
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_lowercase)
            .or_else(|| language_from_url(&self.url))
    }

    /// Given name, else the file name without its extension
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| file_stem(&self.url))
    }

    /// Whether the engine already lists this file among `internal` tracks
    pub fn is_listed_in(&self, internal: &[RawTrack]) -> bool {
        !self.url.is_empty() && internal.iter().any(|t| t.name.contains(&self.url))
    }
}

/// One line of the host-facing subtitle menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleMenuEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub language: String,
    pub label: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// External subtitles not already present in the engine's list
pub fn pending_externals<'a>(
    internal: &[RawTrack],
    externals: &'a [ExternalSubtitle],
) -> Vec<&'a ExternalSubtitle> {
    externals.iter().filter(|s| !s.is_listed_in(internal)).collect()
}

/// Attach every external subtitle the engine does not list yet.
///
/// Failures are logged and skipped. Returns how many were attached.
pub fn attach_external_subtitles(
    engine: &mut dyn MediaEngine,
    externals: &[ExternalSubtitle],
) -> usize {
    let internal = engine.tracks(TrackKind::Subtitle);
    let mut attached = 0;
    for subtitle in pending_externals(&internal, externals) {
        let format = subtitle.format();
        if engine.add_external_subtitle(&subtitle.url, format) {
            info!("Attached external subtitle {} ({})", subtitle.url, format.mime_type());
            attached += 1;
        } else {
            warn!("Failed to attach external subtitle {}", subtitle.url);
        }
    }
    attached
}

/// Internal subtitle tracks followed by the external ones they do not cover
pub fn subtitle_menu(
    engine: &dyn MediaEngine,
    externals: &[ExternalSubtitle],
) -> Vec<SubtitleMenuEntry> {
    let internal = engine.tracks(TrackKind::Subtitle);

    let mut entries: Vec<SubtitleMenuEntry> = resolve_all(&internal)
        .into_iter()
        .map(|t| SubtitleMenuEntry {
            display_name: t.display_name(),
            id: Some(t.id),
            language: t.language,
            label: t.label,
            url: None,
        })
        .collect();

    entries.extend(pending_externals(&internal, externals).into_iter().map(|s| {
        let language = s.language().unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string());
        let label = s.display_name();
        SubtitleMenuEntry {
            id: None,
            display_name: display_label(&language, &label),
            language,
            label,
            url: Some(s.url.clone()),
        }
    }));

    entries
}

/// Path component of a url, without query or fragment
fn url_path(url: &str) -> &str {
    let without_scheme = match url.find("://") {
        Some(pos) => {
            let rest = &url[pos + 3..];
            rest.find('/').map_or("", |slash| &rest[slash..])
        }
        None => url,
    };
    let end = without_scheme
        .find(['?', '#'])
        .unwrap_or(without_scheme.len());
    &without_scheme[..end]
}

fn file_name(url: &str) -> &str {
    let path = url_path(url).trim_end_matches('/');
    path.rsplit('/').next().unwrap_or(path)
}

fn file_stem(url: &str) -> String {
    let name = file_name(url);
    match name.rfind('.') {
        Some(dot) if dot > 0 => name[..dot].to_string(),
        _ => name.to_string(),
    }
}

/// Language tag from `movie.<lang>.srt`
fn language_from_url(url: &str) -> Option<String> {
    let name = file_name(url).to_lowercase();
    let stem = name.strip_suffix(".srt")?;
    let (_, tag) = stem.rsplit_once('.')?;
    let valid = (2..=5).contains(&tag.len())
        && tag.chars().all(|c| c.is_ascii_alphabetic() || c == '-');
    valid.then(|| tag.to_string())
}
