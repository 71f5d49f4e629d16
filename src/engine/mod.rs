//! Media engine capability interface
//!
//! The native player owns decoding, rendering and transport. The bridge only
//! sees it through [`MediaEngine`]: transport commands, track enumeration and
//! the active index per [`TrackKind`].

pub mod simulated;

pub use simulated::SimulatedEngine;

use crate::error::Result;
use crate::player::session::SessionMessage;
use crate::tracks::SubtitleFormat;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tokio::sync::mpsc::UnboundedSender;

/// Native index meaning "no track selected"
pub const DISABLED_INDEX: i32 = -1;

/// Which family of tracks an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Subtitle,
}

impl TrackKind {
    pub fn other(self) -> Self {
        match self {
            TrackKind::Audio => TrackKind::Subtitle,
            TrackKind::Subtitle => TrackKind::Audio,
        }
    }
}

impl Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackKind::Audio => write!(f, "audio"),
            TrackKind::Subtitle => write!(f, "subtitle"),
        }
    }
}

/// Track as reported by the engine: an opaque index plus a free-form name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTrack {
    pub index: i32,
    pub name: String,
}

impl RawTrack {
    pub fn new(index: i32, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.index == DISABLED_INDEX
    }
}

/// Playback states reported by the engine delegate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Opening,
    Buffering,
    Playing,
    Paused,
    Stopped,
    Ended,
    Error,
}

/// Asynchronous notifications raised by the engine, possibly off-thread
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    StateChanged(PlaybackState),
    TimeChanged { millis: i64 },
    /// The engine finished populating its track lists
    TracksReady,
}

/// Handle given to an engine for posting its callbacks.
///
/// Posting never touches session state; messages are drained later on the
/// bridge's own context.
#[derive(Debug, Clone)]
pub struct EngineSink {
    tx: UnboundedSender<SessionMessage>,
}

impl EngineSink {
    pub(crate) fn new(tx: UnboundedSender<SessionMessage>) -> Self {
        Self { tx }
    }

    /// Returns false once the owning session is gone
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.tx.send(SessionMessage::Engine(event)).is_ok()
    }
}

/// Capability interface over a native media player
pub trait MediaEngine: Send {
    fn attach_sink(&mut self, sink: EngineSink);

    fn load(&mut self, url: &str) -> Result<()>;
    fn play(&mut self) -> bool;
    fn pause(&mut self) -> bool;
    fn stop(&mut self);
    fn is_playing(&self) -> bool;

    /// Seek to an absolute position in seconds
    fn seek(&mut self, seconds: f64) -> bool;
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;

    /// Volume in the 0.0..=1.0 range
    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64) -> bool;
    fn is_muted(&self) -> bool;
    fn set_muted(&mut self, muted: bool) -> bool;
    fn rate(&self) -> f64;
    fn set_rate(&mut self, rate: f64) -> bool;

    /// Live track list in native order. Never cached by callers.
    fn tracks(&self, kind: TrackKind) -> Vec<RawTrack>;
    fn current_index(&self, kind: TrackKind) -> i32;
    /// Fire-and-forget; an invalid index may be ignored without notice
    fn set_current_index(&mut self, kind: TrackKind, index: i32);
    /// Attach an out-of-band subtitle file; false if the engine rejected it
    fn add_external_subtitle(&mut self, url: &str, format: SubtitleFormat) -> bool;

    /// Whether [`EngineEvent::TracksReady`] is ever emitted
    fn emits_tracks_ready(&self) -> bool {
        false
    }

    /// Whether audio may be switched to [`DISABLED_INDEX`]
    fn allows_silent_audio(&self) -> bool {
        false
    }
}
