use super::resolve_all;
use super::selection::{TrackChoice, TrackPreferences, select_for};
use crate::engine::{MediaEngine, TrackKind};
use tracing::{debug, info, warn};

/// Outcome of applying the session preferences once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoSelection {
    pub audio: Option<TrackChoice>,
    pub subtitle: Option<TrackChoice>,
}

impl AutoSelection {
    /// True when no engine command was issued
    pub fn is_empty(&self) -> bool {
        self.audio.is_none() && self.subtitle.is_none()
    }
}

/// Decide what to activate for each kind from the engine's live lists
pub fn plan_selection(engine: &dyn MediaEngine, prefs: &TrackPreferences) -> AutoSelection {
    let mut plan = AutoSelection::default();
    for kind in [TrackKind::Audio, TrackKind::Subtitle] {
        let pref = prefs.for_kind(kind);
        if pref.is_empty() {
            continue;
        }

        let tracks = resolve_all(&engine.tracks(kind));
        let choice = select_for(kind, &tracks, pref);

        let choice = match choice {
            Some(c)
                if kind == TrackKind::Audio
                    && c.is_disabled()
                    && !engine.allows_silent_audio() =>
            {
                warn!("Engine cannot play without audio, keeping current audio track");
                None
            }
            other => other,
        };

        match kind {
            TrackKind::Audio => plan.audio = choice,
            TrackKind::Subtitle => plan.subtitle = choice,
        }
    }
    plan
}

/// Apply the session preferences to the engine.
///
/// Kinds without a matching rule are left on the engine's own selection.
pub fn auto_select_tracks(engine: &mut dyn MediaEngine, prefs: &TrackPreferences) -> AutoSelection {
    let plan = plan_selection(engine, prefs);

    for (kind, choice) in [(TrackKind::Audio, &plan.audio), (TrackKind::Subtitle, &plan.subtitle)] {
        match choice {
            Some(choice) => {
                info!("Auto-selecting {} track {}", kind, choice.id);
                engine.set_current_index(kind, choice.index);
            }
            None => debug!("No {} preference matched, keeping engine selection", kind),
        }
    }

    plan
}
