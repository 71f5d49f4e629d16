//! Host-facing events and listener registration

use crate::tracks::TrackInfo;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    PlayerReady,
    PlayerPlay,
    PlayerPause,
    PlayerEnded,
    PlayerExit,
    PlayerTracksChanged,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::PlayerReady => "playerReady",
            EventName::PlayerPlay => "playerPlay",
            EventName::PlayerPause => "playerPause",
            EventName::PlayerEnded => "playerEnded",
            EventName::PlayerExit => "playerExit",
            EventName::PlayerTracksChanged => "playerTracksChanged",
        }
    }
}

impl Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload of `playerTracksChanged`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracksChangedInfo {
    pub from_player_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_track: Option<TrackInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle_track: Option<TrackInfo>,
}

/// Payload of the transport events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackInfo {
    pub from_player_id: String,
    pub current_time: f64,
}

/// Payload of `playerExit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitInfo {
    pub dismiss: bool,
    pub current_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum PlayerEvent {
    PlayerReady(PlaybackInfo),
    PlayerPlay(PlaybackInfo),
    PlayerPause(PlaybackInfo),
    PlayerEnded(PlaybackInfo),
    PlayerExit(ExitInfo),
    PlayerTracksChanged(TracksChangedInfo),
}

impl PlayerEvent {
    pub fn name(&self) -> EventName {
        match self {
            PlayerEvent::PlayerReady(_) => EventName::PlayerReady,
            PlayerEvent::PlayerPlay(_) => EventName::PlayerPlay,
            PlayerEvent::PlayerPause(_) => EventName::PlayerPause,
            PlayerEvent::PlayerEnded(_) => EventName::PlayerEnded,
            PlayerEvent::PlayerExit(_) => EventName::PlayerExit,
            PlayerEvent::PlayerTracksChanged(_) => EventName::PlayerTracksChanged,
        }
    }
}

/// Callback invoked for each matching event
pub type Listener = Box<dyn Fn(&PlayerEvent) + Send>;

/// Returned by [`Listeners::add`]; removes the listener again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(Uuid);

/// Listener registry owned by the bridge
#[derive(Default)]
pub struct Listeners {
    entries: Vec<(ListenerHandle, EventName, Listener)>,
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl Listeners {
    pub fn add(&mut self, name: EventName, listener: Listener) -> ListenerHandle {
        let handle = ListenerHandle(Uuid::new_v4());
        self.entries.push((handle, name, listener));
        handle
    }

    pub fn remove(&mut self, handle: ListenerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(h, _, _)| *h != handle);
        self.entries.len() != before
    }

    /// Deliver `event` to its listeners in registration order
    pub fn emit(&self, event: &PlayerEvent) -> usize {
        let name = event.name();
        let mut delivered = 0;
        for (_, _, listener) in self.entries.iter().filter(|(_, n, _)| *n == name) {
            listener(event);
            delivered += 1;
        }
        delivered
    }
}
