use super::{
    DISABLED_INDEX, EngineEvent, EngineSink, MediaEngine, PlaybackState, RawTrack, TrackKind,
};
use crate::error::{AppError, Result};
use crate::tracks::SubtitleFormat;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug)]
struct SimState {
    url: Option<String>,
    state: PlaybackState,
    position: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    rate: f64,
    audio_tracks: Vec<RawTrack>,
    subtitle_tracks: Vec<RawTrack>,
    audio_index: i32,
    subtitle_index: i32,
    commands: Vec<(TrackKind, i32)>,
    attached: Vec<(String, &'static str)>,
    failing_urls: Vec<String>,
    emits_tracks_ready: bool,
    allows_silent_audio: bool,
    tracks_ready_sent: bool,
    sink: Option<EngineSink>,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            url: None,
            state: PlaybackState::Stopped,
            position: 0.0,
            duration: 0.0,
            volume: 1.0,
            muted: false,
            rate: 1.0,
            audio_tracks: Vec::new(),
            subtitle_tracks: Vec::new(),
            audio_index: DISABLED_INDEX,
            subtitle_index: DISABLED_INDEX,
            commands: Vec::new(),
            attached: Vec::new(),
            failing_urls: Vec::new(),
            emits_tracks_ready: false,
            allows_silent_audio: false,
            tracks_ready_sent: false,
            sink: None,
        }
    }
}

impl SimState {
    fn emit(&self, event: EngineEvent) {
        if let Some(sink) = &self.sink
            && !sink.emit(event)
        {
            debug!("Simulated engine event dropped, session is gone");
        }
    }

    fn tracks_mut(&mut self, kind: TrackKind) -> &mut Vec<RawTrack> {
        match kind {
            TrackKind::Audio => &mut self.audio_tracks,
            TrackKind::Subtitle => &mut self.subtitle_tracks,
        }
    }
}

/// In-process engine used by the CLI and tests.
///
/// Clones share state, so a test can keep one handle to script the engine
/// while the bridge owns another. A factory handing out clones of one engine
/// therefore reuses its tracks and command log across sessions; build a new
/// engine per call for independent sessions.
#[derive(Debug, Clone, Default)]
pub struct SimulatedEngine {
    inner: Arc<Mutex<SimState>>,
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_audio_tracks(self, tracks: Vec<RawTrack>) -> Self {
        self.set_tracks(TrackKind::Audio, tracks);
        self
    }

    pub fn with_subtitle_tracks(self, tracks: Vec<RawTrack>) -> Self {
        self.set_tracks(TrackKind::Subtitle, tracks);
        self
    }

    pub fn with_tracks_ready_signal(self, enabled: bool) -> Self {
        self.state().emits_tracks_ready = enabled;
        self
    }

    pub fn with_silent_audio(self, allowed: bool) -> Self {
        self.state().allows_silent_audio = allowed;
        self
    }

    pub fn with_duration(self, seconds: f64) -> Self {
        self.state().duration = seconds;
        self
    }

    /// Make `add_external_subtitle` fail for this url
    pub fn fail_attach(self, url: impl Into<String>) -> Self {
        self.state().failing_urls.push(url.into());
        self
    }

    /// Replace a track list, as the engine does when it finishes probing
    pub fn set_tracks(&self, kind: TrackKind, tracks: Vec<RawTrack>) {
        let mut state = self.state();
        if kind == TrackKind::Audio && state.audio_index == DISABLED_INDEX {
            state.audio_index = tracks
                .iter()
                .find(|t| !t.is_disabled())
                .map(|t| t.index)
                .unwrap_or(DISABLED_INDEX);
        }
        *state.tracks_mut(kind) = tracks;
    }

    /// Every `set_current_index` call received, in order
    pub fn commands(&self) -> Vec<(TrackKind, i32)> {
        self.state().commands.clone()
    }

    /// Url and mime type of every attached external subtitle
    pub fn attached_subtitles(&self) -> Vec<(String, &'static str)> {
        self.state().attached.clone()
    }

    pub fn loaded_url(&self) -> Option<String> {
        self.state().url.clone()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.state().state
    }

    /// Raise an arbitrary delegate callback
    pub fn emit(&self, event: EngineEvent) {
        let mut state = self.state();
        if let EngineEvent::StateChanged(next) = event {
            state.state = next;
        }
        state.emit(event);
    }

    /// Reach the end of the media
    pub fn finish(&self) {
        let mut state = self.state();
        state.position = state.duration;
        state.state = PlaybackState::Ended;
        state.emit(EngineEvent::StateChanged(PlaybackState::Ended));
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MediaEngine for SimulatedEngine {
    fn attach_sink(&mut self, sink: EngineSink) {
        self.state().sink = Some(sink);
    }

    fn load(&mut self, url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(AppError::Engine("Cannot load an empty url".to_string()));
        }
        let mut state = self.state();
        state.url = Some(url.to_string());
        state.position = 0.0;
        state.tracks_ready_sent = false;
        state.state = PlaybackState::Opening;
        state.emit(EngineEvent::StateChanged(PlaybackState::Opening));
        Ok(())
    }

    fn play(&mut self) -> bool {
        let mut state = self.state();
        if state.url.is_none() {
            return false;
        }
        state.state = PlaybackState::Playing;
        state.emit(EngineEvent::StateChanged(PlaybackState::Playing));
        if state.emits_tracks_ready && !state.tracks_ready_sent {
            state.tracks_ready_sent = true;
            state.emit(EngineEvent::TracksReady);
        }
        true
    }

    fn pause(&mut self) -> bool {
        let mut state = self.state();
        if state.url.is_none() {
            return false;
        }
        state.state = PlaybackState::Paused;
        state.emit(EngineEvent::StateChanged(PlaybackState::Paused));
        true
    }

    fn stop(&mut self) {
        let mut state = self.state();
        state.state = PlaybackState::Stopped;
        state.emit(EngineEvent::StateChanged(PlaybackState::Stopped));
    }

    fn is_playing(&self) -> bool {
        self.state().state == PlaybackState::Playing
    }

    fn seek(&mut self, seconds: f64) -> bool {
        let mut state = self.state();
        if state.url.is_none() {
            return false;
        }
        state.position = if state.duration > 0.0 {
            seconds.clamp(0.0, state.duration)
        } else {
            seconds.max(0.0)
        };
        let millis = (state.position * 1000.0) as i64;
        state.emit(EngineEvent::TimeChanged { millis });
        true
    }

    fn current_time(&self) -> f64 {
        self.state().position
    }

    fn duration(&self) -> f64 {
        self.state().duration
    }

    fn volume(&self) -> f64 {
        self.state().volume
    }

    fn set_volume(&mut self, volume: f64) -> bool {
        self.state().volume = volume.clamp(0.0, 1.0);
        true
    }

    fn is_muted(&self) -> bool {
        self.state().muted
    }

    fn set_muted(&mut self, muted: bool) -> bool {
        self.state().muted = muted;
        true
    }

    fn rate(&self) -> f64 {
        self.state().rate
    }

    fn set_rate(&mut self, rate: f64) -> bool {
        self.state().rate = rate;
        true
    }

    fn tracks(&self, kind: TrackKind) -> Vec<RawTrack> {
        let state = self.state();
        match kind {
            TrackKind::Audio => state.audio_tracks.clone(),
            TrackKind::Subtitle => state.subtitle_tracks.clone(),
        }
    }

    fn current_index(&self, kind: TrackKind) -> i32 {
        let state = self.state();
        match kind {
            TrackKind::Audio => state.audio_index,
            TrackKind::Subtitle => state.subtitle_index,
        }
    }

    fn set_current_index(&mut self, kind: TrackKind, index: i32) {
        let mut state = self.state();
        state.commands.push((kind, index));

        let known =
            index == DISABLED_INDEX || state.tracks_mut(kind).iter().any(|t| t.index == index);
        let allowed = match kind {
            TrackKind::Audio => index != DISABLED_INDEX || state.allows_silent_audio,
            TrackKind::Subtitle => true,
        };
        if !known || !allowed {
            debug!("Simulated engine ignoring {} index {}", kind, index);
            return;
        }

        match kind {
            TrackKind::Audio => state.audio_index = index,
            TrackKind::Subtitle => state.subtitle_index = index,
        }
    }

    fn add_external_subtitle(&mut self, url: &str, format: SubtitleFormat) -> bool {
        let mut state = self.state();
        if state.failing_urls.iter().any(|u| u == url) {
            return false;
        }
        state.attached.push((url.to_string(), format.mime_type()));
        let next = state
            .subtitle_tracks
            .iter()
            .map(|t| t.index)
            .max()
            .map_or(0, |max| max + 1);
        state.subtitle_tracks.push(RawTrack::new(next, url));
        true
    }

    fn emits_tracks_ready(&self) -> bool {
        self.state().emits_tracks_ready
    }

    fn allows_silent_audio(&self) -> bool {
        self.state().allows_silent_audio
    }
}
