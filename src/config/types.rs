use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback behaviour configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Wait after playback starts before auto-selecting tracks (ms)
    pub settle_delay_ms: u64,
    /// Select as soon as the engine reports its tracks, when it can
    pub use_tracks_ready_signal: bool,
    /// Close the player when the media ends
    pub exit_on_end: bool,
    /// Restart from the beginning when the media ends (wins over exit_on_end)
    pub loop_on_end: bool,
    /// Initial playback rate
    pub default_rate: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 1000,
            use_tracks_ready_signal: true,
            exit_on_end: true,
            loop_on_end: false,
            default_rate: 1.0,
        }
    }
}

impl PlaybackConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Track defaults applied when the host leaves a preference out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackDefaultsConfig {
    /// Audio fallback locale used when `preferredLocale` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_locale: Option<String>,
    /// Re-enabling subtitles with nothing to restore picks the first track
    pub first_track_on_enable: bool,
}

impl Default for TrackDefaultsConfig {
    fn default() -> Self {
        Self {
            preferred_locale: None,
            first_track_on_enable: true,
        }
    }
}
