//! Scripted sessions against the simulated engine

use crate::config::AppConfig;
use crate::engine::{MediaEngine, RawTrack, SimulatedEngine, TrackKind};
use crate::error::Result;
use crate::events::{EventName, PlayerEvent};
use crate::player::{PlayerBridge, PlayerOptions, PlayerResult};
use serde::Deserialize;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scenario {
    pub options: Option<PlayerOptions>,
    pub audio_tracks: Vec<RawTrack>,
    pub subtitle_tracks: Vec<RawTrack>,
    pub tracks_ready_signal: bool,
    pub silent_audio: bool,
    pub duration: f64,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    /// Open a new player, replacing the current one
    Init { options: Option<PlayerOptions> },
    /// Let timers run
    Wait { ms: u64 },
    Play,
    Pause,
    Seek { seconds: f64 },
    SelectTrack { kind: TrackKind, index: i32 },
    EnableSubtitles { enabled: bool },
    /// Replace a track list, as a late engine scan would
    SetTracks { kind: TrackKind, tracks: Vec<RawTrack> },
    /// Reach the end of the media
    Finish,
    Exit,
}

/// What a scenario produced, in order
#[derive(Debug, Default)]
pub struct ScenarioOutcome {
    pub events: Vec<PlayerEvent>,
    pub results: Vec<PlayerResult>,
    pub commands: Vec<(TrackKind, i32)>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn engine(&self) -> SimulatedEngine {
        SimulatedEngine::new()
            .with_duration(self.duration)
            .with_audio_tracks(self.audio_tracks.clone())
            .with_subtitle_tracks(self.subtitle_tracks.clone())
            .with_tracks_ready_signal(self.tracks_ready_signal)
            .with_silent_audio(self.silent_audio)
    }

    /// Run every action, processing engine callbacks after each one
    pub async fn run(&self, config: AppConfig) -> ScenarioOutcome {
        // Each initPlayer gets a fresh engine; actions drive the latest one
        let current = Arc::new(Mutex::new(self.engine()));
        let slot = current.clone();
        let template = self.clone();
        let mut bridge = PlayerBridge::new(
            config,
            Handle::current(),
            Box::new(move || {
                let engine = template.engine();
                *slot.lock().unwrap_or_else(|e| e.into_inner()) = engine.clone();
                Box::new(engine) as Box<dyn MediaEngine>
            }),
        );
        let engine = || current.lock().unwrap_or_else(|e| e.into_inner()).clone();

        let events = Arc::new(Mutex::new(Vec::new()));
        for name in [
            EventName::PlayerReady,
            EventName::PlayerPlay,
            EventName::PlayerPause,
            EventName::PlayerEnded,
            EventName::PlayerExit,
            EventName::PlayerTracksChanged,
        ] {
            let sink = events.clone();
            bridge.add_listener(
                name,
                Box::new(move |event: &PlayerEvent| {
                    sink.lock().unwrap_or_else(|e| e.into_inner()).push(event.clone());
                }),
            );
        }

        let mut results = vec![bridge.init_player(self.options.clone())];
        bridge.process_engine_events();

        for action in &self.actions {
            info!("Scenario action {:?}", action);
            let result = match action {
                Action::Init { options } => Some(bridge.init_player(options.clone())),
                Action::Wait { ms } => {
                    tokio::time::sleep(Duration::from_millis(*ms)).await;
                    None
                }
                Action::Play => Some(bridge.play()),
                Action::Pause => Some(bridge.pause()),
                Action::Seek { seconds } => Some(bridge.set_current_time(Some(*seconds))),
                Action::SelectTrack { kind, index } => Some(bridge.select_track(*kind, *index)),
                Action::EnableSubtitles { enabled } => Some(bridge.enable_subtitles(*enabled)),
                Action::SetTracks { kind, tracks } => {
                    engine().set_tracks(*kind, tracks.clone());
                    None
                }
                Action::Finish => {
                    engine().finish();
                    None
                }
                Action::Exit => Some(bridge.exit_player()),
            };
            results.extend(result);
            bridge.process_engine_events();
        }

        let events = events.lock().unwrap_or_else(|e| e.into_inner()).clone();
        ScenarioOutcome {
            events,
            results,
            commands: engine().commands(),
        }
    }
}
