use crate::engine::{MediaEngine, TrackKind};
use crate::events::{Listeners, PlayerEvent, TracksChangedInfo};
use crate::tracks::{ResolvedTrack, resolve_current, resolve_index};
use tracing::info;

/// Emits `playerTracksChanged` whenever a track switch is requested.
///
/// The event is sent as soon as the command is issued; engines give no
/// acknowledgement, so a silently ignored switch is still reported.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    player_id: String,
}

impl ChangeNotifier {
    pub fn new(player_id: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
        }
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn on_selection_changed(
        &self,
        engine: &mut dyn MediaEngine,
        kind: TrackKind,
        new_index: i32,
        listeners: &Listeners,
    ) -> TracksChangedInfo {
        engine.set_current_index(kind, new_index);

        let changed = resolve_index(engine, kind, new_index);
        let other = resolve_current(engine, kind.other());
        info!("{} track switched to {} ({})", kind, changed.id, changed.language);

        let info = match kind {
            TrackKind::Audio => self.info(changed, other),
            TrackKind::Subtitle => self.info(other, changed),
        };
        listeners.emit(&PlayerEvent::PlayerTracksChanged(info.clone()));
        info
    }

    /// Report the engine's current selection for both kinds
    pub fn notify_current(
        &self,
        engine: &dyn MediaEngine,
        listeners: &Listeners,
    ) -> TracksChangedInfo {
        let info = self.info(
            resolve_current(engine, TrackKind::Audio),
            resolve_current(engine, TrackKind::Subtitle),
        );
        listeners.emit(&PlayerEvent::PlayerTracksChanged(info.clone()));
        info
    }

    fn info(&self, audio: ResolvedTrack, subtitle: ResolvedTrack) -> TracksChangedInfo {
        TracksChangedInfo {
            from_player_id: self.player_id.clone(),
            audio_track: Some(audio),
            subtitle_track: Some(subtitle),
        }
    }
}
