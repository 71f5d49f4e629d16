//! Command bridge between the host and the single live player session

pub mod options;
pub mod result;
pub mod session;

pub use options::{DEFAULT_PLAYER_ID, PlayerOptions};
pub use result::PlayerResult;
pub use session::{PlayerSession, SessionMessage};

use crate::config::AppConfig;
use crate::engine::{DISABLED_INDEX, EngineEvent, MediaEngine, PlaybackState, TrackKind};
use crate::error::{AppError, Result};
use crate::events::{
    EventName, ExitInfo, Listener, ListenerHandle, Listeners, PlaybackInfo, PlayerEvent,
};
use crate::tracks::external::{attach_external_subtitles, subtitle_menu};
use crate::tracks::{DisplayTrack, auto_select_tracks, resolve_all};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Builds a fresh engine for every `initPlayer`
pub type EngineFactory = Box<dyn Fn() -> Box<dyn MediaEngine> + Send>;

pub struct PlayerBridge {
    config: AppConfig,
    runtime: Handle,
    factory: EngineFactory,
    session: Option<PlayerSession>,
    listeners: Listeners,
}

impl std::fmt::Debug for PlayerBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerBridge")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl PlayerBridge {
    pub fn new(config: AppConfig, runtime: Handle, factory: EngineFactory) -> Self {
        Self {
            config,
            runtime,
            factory,
            session: None,
            listeners: Listeners::default(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn has_player(&self) -> bool {
        self.session.is_some()
    }

    pub fn add_listener(&mut self, name: EventName, listener: Listener) -> ListenerHandle {
        self.listeners.add(name, listener)
    }

    pub fn remove_listener(&mut self, handle: ListenerHandle) -> bool {
        self.listeners.remove(handle)
    }

    pub fn echo(&self, value: &str) -> PlayerResult {
        PlayerResult::ok("echo", value)
    }

    pub fn init_player(&mut self, options: Option<PlayerOptions>) -> PlayerResult {
        let method = "initPlayer";
        let Some(options) = options else {
            return PlayerResult::failure(
                method,
                AppError::InvalidOptions("Must provide a PlayerOptions object".to_string()),
            );
        };
        PlayerResult::from_result(method, self.start_session(&options))
    }

    fn start_session(&mut self, options: &PlayerOptions) -> Result<String> {
        let url = options.validate()?.to_string();

        if let Some(mut previous) = self.session.take() {
            info!("Replacing player {}", previous.player_id());
            previous.shutdown();
        }

        let player_id = options.player_id().to_string();
        let preferences = options.preferences(&self.config.tracks);
        let mut session = PlayerSession::new((self.factory)(), &player_id, preferences);
        session.exit_on_end = options.exit_on_end.unwrap_or(self.config.playback.exit_on_end);
        session.loop_on_end = options.loop_on_end.unwrap_or(self.config.playback.loop_on_end);
        session.externals = options.subtitles.clone();

        let engine = session.engine.as_mut();
        engine.load(&url)?;
        engine.set_rate(options.rate.unwrap_or(self.config.playback.default_rate));
        if let Some(start) = options.start_at_sec.filter(|s| *s > 0.0) {
            engine.seek(start);
        }
        let attached = attach_external_subtitles(engine, &session.externals);
        debug!("{} external subtitles attached", attached);
        if !engine.play() {
            warn!("Engine refused to start playback of {}", url);
        }

        info!("Player {} started with {}", player_id, url);
        self.session = Some(session);
        Ok(player_id)
    }

    /// Handle every queued engine callback and timer message.
    ///
    /// Must be called from the context that owns the bridge.
    pub fn process_engine_events(&mut self) -> usize {
        let messages = match self.session.as_mut() {
            Some(session) => session.drain(),
            None => return 0,
        };
        let count = messages.len();

        for msg in messages {
            if self.session.is_none() {
                debug!("Player exited, dropping remaining messages");
                break;
            }
            match msg {
                SessionMessage::Engine(EngineEvent::StateChanged(state)) => {
                    self.on_state_changed(state)
                }
                SessionMessage::Engine(EngineEvent::TimeChanged { millis }) => {
                    debug!("Playback time {} ms", millis);
                }
                SessionMessage::Engine(EngineEvent::TracksReady) => self.on_tracks_ready(),
                SessionMessage::SettleElapsed { generation } => self.on_settle_elapsed(generation),
            }
        }
        count
    }

    fn on_state_changed(&mut self, state: PlaybackState) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let info = PlaybackInfo {
            from_player_id: session.player_id().to_string(),
            current_time: session.engine.current_time(),
        };

        match state {
            PlaybackState::Playing => {
                if !session.ready_sent {
                    session.ready_sent = true;
                    self.listeners.emit(&PlayerEvent::PlayerReady(info.clone()));
                }
                self.listeners.emit(&PlayerEvent::PlayerPlay(info));
                session.playback_started = true;
                self.schedule_selection();
            }
            PlaybackState::Paused => {
                self.listeners.emit(&PlayerEvent::PlayerPause(info));
            }
            PlaybackState::Ended => {
                self.listeners.emit(&PlayerEvent::PlayerEnded(info));
                if session.loop_on_end {
                    debug!("Looping player {}", session.player_id());
                    session.engine.seek(0.0);
                    session.engine.play();
                } else if session.exit_on_end {
                    self.exit_session(false);
                }
            }
            PlaybackState::Error => warn!("Engine reported a playback error"),
            other => debug!("Engine state {:?}", other),
        }
    }

    fn on_tracks_ready(&mut self) {
        let waits = self.waits_for_signal();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.tracks_ready = true;
        debug!("Engine reported its tracks");
        if waits && session.selection_armed && session.playback_started {
            self.run_auto_selection();
        }
    }

    fn on_settle_elapsed(&mut self, generation: u64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.timer.take_elapsed(generation) {
            debug!("Ignoring stale settle timer {}", generation);
            return;
        }
        if session.selection_armed {
            self.run_auto_selection();
        }
    }

    fn waits_for_signal(&self) -> bool {
        self.config.playback.use_tracks_ready_signal
            && self
                .session
                .as_ref()
                .is_some_and(|s| s.engine.emits_tracks_ready())
    }

    /// Start the settle delay, or select at once if the engine already
    /// reported its tracks
    fn schedule_selection(&mut self) {
        let waits = self.waits_for_signal();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.selection_armed {
            return;
        }
        if waits && session.tracks_ready {
            self.run_auto_selection();
        } else {
            session.arm_settle_timer(&self.runtime, self.config.playback.settle_delay());
        }
    }

    fn run_auto_selection(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.selection_armed = false;
        session.timer.cancel();

        let applied = auto_select_tracks(session.engine.as_mut(), &session.preferences);
        if !applied.is_empty() {
            session.notifier.notify_current(session.engine.as_ref(), &self.listeners);
        }
    }

    fn exit_session(&mut self, dismiss: bool) -> bool {
        let Some(mut session) = self.session.take() else {
            return false;
        };
        let current_time = session.engine.current_time();
        session.shutdown();
        info!("Player {} exited at {:.1}s", session.player_id(), current_time);
        self.listeners.emit(&PlayerEvent::PlayerExit(ExitInfo { dismiss, current_time }));
        true
    }

    fn with_session<T: serde::Serialize>(
        &mut self,
        method: &str,
        f: impl FnOnce(&mut PlayerSession, &Listeners) -> Result<T>,
    ) -> PlayerResult {
        let result = match self.session.as_mut() {
            Some(session) if session.is_alive() => f(session, &self.listeners),
            _ => Err(AppError::PlayerNotFound),
        };
        PlayerResult::from_result(method, result)
    }

    pub fn is_playing(&mut self) -> PlayerResult {
        self.with_session("isPlaying", |s, _| Ok(s.engine.is_playing()))
    }

    pub fn play(&mut self) -> PlayerResult {
        self.with_session("play", |s, _| Ok(s.engine.play()))
    }

    pub fn pause(&mut self) -> PlayerResult {
        self.with_session("pause", |s, _| Ok(s.engine.pause()))
    }

    pub fn get_duration(&mut self) -> PlayerResult {
        self.with_session("getDuration", |s, _| Ok(s.engine.duration()))
    }

    pub fn get_current_time(&mut self) -> PlayerResult {
        self.with_session("getCurrentTime", |s, _| Ok(s.engine.current_time()))
    }

    pub fn set_current_time(&mut self, seektime: Option<f64>) -> PlayerResult {
        self.with_session("setCurrentTime", |s, _| {
            let seektime = seektime
                .filter(|t| t.is_finite() && *t >= 0.0)
                .ok_or_else(|| {
                    AppError::InvalidOptions("Must provide a valid seektime".to_string())
                })?;
            s.engine.seek(seektime);
            Ok(s.engine.current_time())
        })
    }

    pub fn get_volume(&mut self) -> PlayerResult {
        self.with_session("getVolume", |s, _| Ok(s.engine.volume()))
    }

    pub fn set_volume(&mut self, volume: Option<f64>) -> PlayerResult {
        self.with_session("setVolume", |s, _| {
            let volume = volume
                .filter(|v| (0.0..=1.0).contains(v))
                .ok_or_else(|| {
                    AppError::InvalidOptions("Volume must be between 0 and 1".to_string())
                })?;
            s.engine.set_volume(volume);
            Ok(volume)
        })
    }

    pub fn get_muted(&mut self) -> PlayerResult {
        self.with_session("getMuted", |s, _| Ok(s.engine.is_muted()))
    }

    pub fn set_muted(&mut self, muted: Option<bool>) -> PlayerResult {
        self.with_session("setMuted", |s, _| {
            let muted = muted.ok_or_else(|| {
                AppError::InvalidOptions("Must provide a muted value".to_string())
            })?;
            s.engine.set_muted(muted);
            Ok(muted)
        })
    }

    pub fn set_rate(&mut self, rate: Option<f64>) -> PlayerResult {
        self.with_session("setRate", |s, _| {
            let rate = rate
                .ok_or_else(|| AppError::InvalidOptions("Must provide a rate".to_string()))?;
            let rate = options::validate_rate(rate)?;
            s.engine.set_rate(rate);
            Ok(rate)
        })
    }

    pub fn get_rate(&mut self) -> PlayerResult {
        self.with_session("getRate", |s, _| Ok(s.engine.rate()))
    }

    /// Stop and discard the player without a `playerExit` event
    pub fn stop_all_players(&mut self) -> PlayerResult {
        match self.session.take() {
            Some(mut session) => {
                session.shutdown();
                info!("Player {} stopped", session.player_id());
                PlayerResult::ok("stopAllPlayers", true)
            }
            None => PlayerResult::failure("stopAllPlayers", AppError::PlayerNotFound),
        }
    }

    pub fn exit_player(&mut self) -> PlayerResult {
        if self.exit_session(true) {
            PlayerResult::ok("exitPlayer", true)
        } else {
            PlayerResult::failure("exitPlayer", AppError::PlayerNotFound)
        }
    }

    pub fn enable_subtitles(&mut self, enabled: bool) -> PlayerResult {
        let first_track = self.config.tracks.first_track_on_enable;
        self.with_session("enableSubtitles", |s, listeners| {
            let engine = s.engine.as_mut();
            let current = engine.current_index(TrackKind::Subtitle);

            let target = if enabled {
                if current != DISABLED_INDEX {
                    debug!("Subtitle track {} already active", current);
                    return Ok(enabled);
                }
                let listed: Vec<i32> = engine
                    .tracks(TrackKind::Subtitle)
                    .iter()
                    .filter(|t| !t.is_disabled())
                    .map(|t| t.index)
                    .collect();
                let first = if first_track { listed.first().copied() } else { None };
                s.remembered_subtitle
                    .take()
                    .filter(|idx| listed.contains(idx))
                    .or(first)
            } else {
                if current != DISABLED_INDEX {
                    s.remembered_subtitle = Some(current);
                }
                Some(DISABLED_INDEX)
            };

            match target {
                Some(index) => {
                    s.notifier
                        .on_selection_changed(engine, TrackKind::Subtitle, index, listeners);
                }
                None => debug!("No subtitle track to enable"),
            }
            Ok(enabled)
        })
    }

    pub fn get_tracks(&mut self, kind: TrackKind) -> PlayerResult {
        self.with_session("getTracks", |s, _| {
            let tracks: Vec<DisplayTrack> = resolve_all(&s.engine.tracks(kind))
                .into_iter()
                .map(DisplayTrack::from)
                .collect();
            Ok(tracks)
        })
    }

    /// Switch a track by native index; -1 disables the kind
    pub fn select_track(&mut self, kind: TrackKind, index: i32) -> PlayerResult {
        self.with_session("selectTrack", |s, listeners| {
            if kind == TrackKind::Audio
                && index == DISABLED_INDEX
                && !s.engine.allows_silent_audio()
            {
                return Err(AppError::InvalidOptions(
                    "Audio cannot be disabled on this engine".to_string(),
                ));
            }
            if kind == TrackKind::Subtitle {
                s.remembered_subtitle = None;
            }
            Ok(s.notifier
                .on_selection_changed(s.engine.as_mut(), kind, index, listeners))
        })
    }

    pub fn get_subtitle_menu(&mut self) -> PlayerResult {
        self.with_session("getSubtitleMenu", |s, _| {
            Ok(subtitle_menu(s.engine.as_ref(), &s.externals))
        })
    }
}

impl Drop for PlayerBridge {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RawTrack, SimulatedEngine};
    use crate::events::TracksChangedInfo;
    use crate::tracks::ExternalSubtitle;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn movie_engine() -> SimulatedEngine {
        SimulatedEngine::new()
            .with_duration(120.0)
            .with_audio_tracks(vec![
                RawTrack::new(0, "English"),
                RawTrack::new(1, "[FR] French"),
                RawTrack::new(2, "Spanish (es)"),
            ])
            .with_subtitle_tracks(vec![
                RawTrack::new(-1, "Disable"),
                RawTrack::new(3, "English [en]"),
                RawTrack::new(4, "Deutsch"),
            ])
    }

    fn bridge_with(engine: &SimulatedEngine) -> PlayerBridge {
        let engine = engine.clone();
        PlayerBridge::new(
            AppConfig::default(),
            Handle::current(),
            Box::new(move || Box::new(engine.clone()) as Box<dyn MediaEngine>),
        )
    }

    fn record(bridge: &mut PlayerBridge, names: &[EventName]) -> Arc<Mutex<Vec<PlayerEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        for name in names {
            let sink = seen.clone();
            bridge.add_listener(
                *name,
                Box::new(move |event: &PlayerEvent| sink.lock().unwrap().push(event.clone())),
            );
        }
        seen
    }

    fn tracks_changed(events: &[PlayerEvent]) -> Vec<TracksChangedInfo> {
        events
            .iter()
            .filter_map(|e| match e {
                PlayerEvent::PlayerTracksChanged(info) => Some(info.clone()),
                _ => None,
            })
            .collect()
    }

    fn options(value: serde_json::Value) -> Option<PlayerOptions> {
        Some(serde_json::from_value(value).unwrap())
    }

    #[tokio::test]
    async fn test_commands_need_a_player() {
        let engine = movie_engine();
        let mut bridge = bridge_with(&engine);

        let result = bridge.play();
        assert!(!result.result);
        assert_eq!(result.message.as_deref(), Some("Player does not exist"));
        assert!(!bridge.exit_player().result);
        assert!(!bridge.select_track(TrackKind::Subtitle, 3).result);
        assert!(engine.commands().is_empty());
    }

    #[tokio::test]
    async fn test_init_rejects_bad_options() {
        let engine = movie_engine();
        let mut bridge = bridge_with(&engine);

        assert!(!bridge.init_player(None).result);
        let result = bridge.init_player(options(serde_json::json!({"url": ""})));
        assert_eq!(result.message.as_deref(), Some("Must provide a Video Url"));
        assert!(!bridge.has_player());
        assert!(engine.loaded_url().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_selection_after_settle_delay() {
        let engine = movie_engine();
        let mut bridge = bridge_with(&engine);
        let seen = record(&mut bridge, &[EventName::PlayerReady, EventName::PlayerTracksChanged]);

        let result = bridge.init_player(options(serde_json::json!({
            "url": "https://cdn.example/movie.mkv",
            "audioLocale": "fr",
            "subtitleLocale": "de"
        })));
        assert!(result.result);
        assert_eq!(result.value, Some(serde_json::json!("default")));

        bridge.process_engine_events();
        assert!(engine.commands().is_empty());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        bridge.process_engine_events();

        assert_eq!(
            engine.commands(),
            vec![(TrackKind::Audio, 1), (TrackKind::Subtitle, 4)]
        );
        let events = seen.lock().unwrap().clone();
        assert_eq!(events[0].name(), EventName::PlayerReady);
        let changed = tracks_changed(&events);
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].audio_track.as_ref().unwrap().id, "1");
        assert_eq!(changed[0].subtitle_track.as_ref().unwrap().id, "4");
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_runs_once() {
        let engine = movie_engine();
        let mut bridge = bridge_with(&engine);
        bridge.init_player(options(serde_json::json!({
            "url": "https://cdn.example/movie.mkv",
            "audioLocale": "fr"
        })));
        bridge.process_engine_events();

        tokio::time::sleep(Duration::from_millis(1100)).await;
        bridge.process_engine_events();

        bridge.pause();
        bridge.play();
        bridge.process_engine_events();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        bridge.process_engine_events();

        assert_eq!(engine.commands(), vec![(TrackKind::Audio, 1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tracks_ready_signal_skips_delay() {
        let engine = movie_engine().with_tracks_ready_signal(true);
        let mut bridge = bridge_with(&engine);
        bridge.init_player(options(serde_json::json!({
            "url": "https://cdn.example/movie.mkv",
            "subtitleTrackId": "off"
        })));

        bridge.process_engine_events();
        assert_eq!(engine.commands(), vec![(TrackKind::Subtitle, DISABLED_INDEX)]);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        bridge.process_engine_events();
        assert_eq!(engine.commands().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_matching_preference_issues_nothing() {
        let engine = SimulatedEngine::new()
            .with_audio_tracks(vec![RawTrack::new(0, "Track 1"), RawTrack::new(1, "Track 2")]);
        let mut bridge = bridge_with(&engine);
        let seen = record(&mut bridge, &[EventName::PlayerTracksChanged]);
        bridge.init_player(options(serde_json::json!({
            "url": "https://cdn.example/movie.mkv",
            "audioLocale": "fr"
        })));
        bridge.process_engine_events();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        bridge.process_engine_events();

        assert!(engine.commands().is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_before_settle_cancels_selection() {
        let engine = movie_engine();
        let mut bridge = bridge_with(&engine);
        let seen = record(&mut bridge, &[EventName::PlayerExit]);
        bridge.init_player(options(serde_json::json!({
            "url": "https://cdn.example/movie.mkv",
            "audioLocale": "fr"
        })));
        bridge.process_engine_events();

        assert!(bridge.exit_player().result);
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(bridge.process_engine_events(), 0);

        assert!(engine.commands().is_empty());
        assert_eq!(engine.playback_state(), PlaybackState::Stopped);
        let events = seen.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![PlayerEvent::PlayerExit(ExitInfo { dismiss: true, current_time: 0.0 })]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_tracks_appearing_late_are_seen() {
        let engine = SimulatedEngine::new();
        let mut bridge = bridge_with(&engine);
        bridge.init_player(options(serde_json::json!({
            "url": "https://cdn.example/movie.mkv",
            "subtitleLocale": "en"
        })));
        bridge.process_engine_events();

        engine.set_tracks(
            TrackKind::Subtitle,
            vec![RawTrack::new(-1, "Disable"), RawTrack::new(7, "English")],
        );
        tokio::time::sleep(Duration::from_millis(1100)).await;
        bridge.process_engine_events();

        assert_eq!(engine.commands(), vec![(TrackKind::Subtitle, 7)]);
    }

    #[tokio::test]
    async fn test_select_track_reports_both_kinds() {
        let engine = movie_engine();
        let mut bridge = bridge_with(&engine);
        let seen = record(&mut bridge, &[EventName::PlayerTracksChanged]);
        bridge.init_player(options(serde_json::json!({"url": "/media/movie.mkv"})));

        let result = bridge.select_track(TrackKind::Subtitle, 3);
        assert!(result.result);

        let changed = tracks_changed(&seen.lock().unwrap());
        assert_eq!(changed.len(), 1);
        let audio = changed[0].audio_track.as_ref().unwrap();
        let subtitle = changed[0].subtitle_track.as_ref().unwrap();
        assert_eq!(audio.id, "0");
        assert_eq!(audio.language, "en");
        assert_eq!(subtitle.id, "3");
        assert_eq!(subtitle.language, "en");
    }

    #[tokio::test]
    async fn test_ignored_switch_is_still_reported() {
        let engine = movie_engine();
        let mut bridge = bridge_with(&engine);
        let seen = record(&mut bridge, &[EventName::PlayerTracksChanged]);
        bridge.init_player(options(serde_json::json!({"url": "/media/movie.mkv"})));

        bridge.select_track(TrackKind::Subtitle, 42);

        let changed = tracks_changed(&seen.lock().unwrap());
        let subtitle = changed[0].subtitle_track.as_ref().unwrap();
        assert_eq!(subtitle.id, "42");
        assert_eq!(subtitle.label, "Unknown");
        assert_eq!(engine.current_index(TrackKind::Subtitle), DISABLED_INDEX);
    }

    #[tokio::test]
    async fn test_audio_cannot_be_disabled_without_engine_support() {
        let engine = movie_engine();
        let mut bridge = bridge_with(&engine);
        bridge.init_player(options(serde_json::json!({"url": "/media/movie.mkv"})));

        assert!(!bridge.select_track(TrackKind::Audio, DISABLED_INDEX).result);
        assert!(engine.commands().is_empty());
    }

    #[tokio::test]
    async fn test_enable_subtitles_restores_previous_track() {
        let engine = movie_engine();
        let mut bridge = bridge_with(&engine);
        bridge.init_player(options(serde_json::json!({"url": "/media/movie.mkv"})));
        bridge.select_track(TrackKind::Subtitle, 4);

        assert!(bridge.enable_subtitles(false).result);
        assert_eq!(engine.current_index(TrackKind::Subtitle), DISABLED_INDEX);

        bridge.enable_subtitles(true);
        assert_eq!(engine.current_index(TrackKind::Subtitle), 4);
    }

    #[tokio::test]
    async fn test_enable_subtitles_keeps_active_track() {
        let engine = movie_engine();
        let mut bridge = bridge_with(&engine);
        bridge.init_player(options(serde_json::json!({"url": "/media/movie.mkv"})));

        bridge.select_track(TrackKind::Subtitle, 4);
        bridge.enable_subtitles(false);
        bridge.enable_subtitles(true);
        assert_eq!(engine.current_index(TrackKind::Subtitle), 4);

        bridge.select_track(TrackKind::Subtitle, 3);
        bridge.enable_subtitles(true);
        assert_eq!(engine.current_index(TrackKind::Subtitle), 3);

        // An explicit choice replaces whatever was remembered
        bridge.select_track(TrackKind::Subtitle, 4);
        bridge.enable_subtitles(false);
        bridge.select_track(TrackKind::Subtitle, DISABLED_INDEX);
        bridge.enable_subtitles(true);
        assert_eq!(engine.current_index(TrackKind::Subtitle), 3);
        assert_eq!(engine.commands().last(), Some(&(TrackKind::Subtitle, 3)));
    }

    #[tokio::test]
    async fn test_get_tracks_includes_display_names() {
        let engine = movie_engine();
        let mut bridge = bridge_with(&engine);
        bridge.init_player(options(serde_json::json!({"url": "/media/movie.mkv"})));

        let result = bridge.get_tracks(TrackKind::Audio);
        let tracks = result.value.unwrap();
        assert_eq!(tracks[1]["id"], "1");
        assert_eq!(tracks[1]["label"], "[FR] French");
        assert_eq!(tracks[1]["displayName"], "\u{1F1EB}\u{1F1F7} [FR] French");

        let menu = bridge.get_subtitle_menu().value.unwrap();
        assert_eq!(menu[0]["displayName"], "Disabled");
        assert_eq!(menu[2]["displayName"], "\u{1F1E9}\u{1F1EA} Deutsch");
    }

    #[tokio::test]
    async fn test_enable_subtitles_picks_first_track() {
        let engine = movie_engine();
        let mut bridge = bridge_with(&engine);
        bridge.init_player(options(serde_json::json!({"url": "/media/movie.mkv"})));

        bridge.enable_subtitles(true);
        assert_eq!(engine.current_index(TrackKind::Subtitle), 3);
    }

    #[tokio::test]
    async fn test_end_of_media_exits_or_loops() {
        let engine = movie_engine();
        let mut bridge = bridge_with(&engine);
        let seen = record(&mut bridge, &[EventName::PlayerEnded, EventName::PlayerExit]);
        bridge.init_player(options(serde_json::json!({
            "url": "/media/movie.mkv",
            "loopOnEnd": true
        })));
        bridge.process_engine_events();

        engine.finish();
        bridge.process_engine_events();
        assert!(bridge.has_player());
        assert!(engine.is_playing());
        assert_eq!(engine.current_time(), 0.0);

        bridge.init_player(options(serde_json::json!({"url": "/media/movie.mkv"})));
        bridge.process_engine_events();
        engine.finish();
        bridge.process_engine_events();

        assert!(!bridge.has_player());
        let names: Vec<EventName> = seen.lock().unwrap().iter().map(PlayerEvent::name).collect();
        assert_eq!(
            names,
            vec![EventName::PlayerEnded, EventName::PlayerEnded, EventName::PlayerExit]
        );
    }

    #[tokio::test]
    async fn test_init_attaches_external_subtitles() {
        let engine = movie_engine().fail_attach("http://x/broken.srt");
        let mut bridge = bridge_with(&engine);
        let mut opts = PlayerOptions::new("https://cdn.example/movie.mkv");
        opts.subtitles = vec![
            ExternalSubtitle::new("http://x/movie.fr.srt"),
            ExternalSubtitle::new("http://x/broken.srt"),
        ];

        assert!(bridge.init_player(Some(opts)).result);
        let names: Vec<String> = engine
            .tracks(TrackKind::Subtitle)
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert!(names.contains(&"http://x/movie.fr.srt".to_string()));
        assert!(!names.contains(&"http://x/broken.srt".to_string()));

        let menu = bridge.get_subtitle_menu();
        let entries = menu.value.unwrap();
        let urls: Vec<&str> = entries
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e.get("url").and_then(|u| u.as_str()))
            .collect();
        assert_eq!(urls, vec!["http://x/broken.srt"]);
    }

    #[tokio::test]
    async fn test_transport_commands() {
        let engine = movie_engine();
        let mut bridge = bridge_with(&engine);
        bridge.init_player(options(serde_json::json!({
            "url": "/media/movie.mkv",
            "rate": 1.5,
            "startAtSec": 10.0
        })));

        assert_eq!(bridge.get_rate().value_f64(), Some(1.5));
        assert_eq!(bridge.get_current_time().value_f64(), Some(10.0));
        assert_eq!(bridge.get_duration().value_f64(), Some(120.0));
        assert_eq!(bridge.set_current_time(Some(30.0)).value_f64(), Some(30.0));
        assert!(!bridge.set_volume(Some(1.5)).result);
        assert!(bridge.set_volume(Some(0.25)).result);
        assert_eq!(bridge.get_volume().value_f64(), Some(0.25));
        assert!(bridge.set_muted(Some(true)).result);
        assert_eq!(bridge.get_muted().value_bool(), Some(true));
        assert!(!bridge.set_rate(Some(8.0)).result);
        assert_eq!(bridge.is_playing().value_bool(), Some(true));
        assert!(bridge.pause().result);
        assert_eq!(bridge.is_playing().value_bool(), Some(false));
    }

    #[tokio::test]
    async fn test_stop_all_players_discards_session() {
        let engine = movie_engine();
        let mut bridge = bridge_with(&engine);
        let seen = record(&mut bridge, &[EventName::PlayerExit]);
        bridge.init_player(options(serde_json::json!({"url": "/media/movie.mkv"})));

        assert!(bridge.stop_all_players().result);
        assert!(!bridge.has_player());
        assert_eq!(engine.playback_state(), PlaybackState::Stopped);
        assert!(seen.lock().unwrap().is_empty());
        assert!(!bridge.get_rate().result);
    }

    #[tokio::test]
    async fn test_init_replaces_existing_player() {
        let first = movie_engine();
        let mut bridge = bridge_with(&first);
        let seen = record(&mut bridge, &[EventName::PlayerExit]);
        bridge.init_player(options(serde_json::json!({"url": "/media/a.mkv", "playerId": "one"})));
        let result = bridge.init_player(options(serde_json::json!({
            "url": "/media/b.mkv",
            "playerId": "two"
        })));

        assert_eq!(result.value, Some(serde_json::json!("two")));
        assert_eq!(first.loaded_url().as_deref(), Some("/media/b.mkv"));
        assert!(seen.lock().unwrap().is_empty());
    }
}
