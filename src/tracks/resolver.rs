use super::ResolvedTrack;
use super::language::language_or_unknown;
use crate::engine::{DISABLED_INDEX, MediaEngine, RawTrack, TrackKind};
use tracing::debug;

/// Turn an engine track into its host-facing form
pub fn resolve(raw: &RawTrack) -> ResolvedTrack {
    if raw.is_disabled() {
        return ResolvedTrack::disabled();
    }

    let language = language_or_unknown(&raw.name);
    if language == super::language::UNKNOWN_LANGUAGE {
        debug!("No language detected for track {} ({:?})", raw.index, raw.name);
    }

    ResolvedTrack {
        id: raw.index.to_string(),
        language,
        label: raw.name.clone(),
    }
}

pub fn resolve_all(tracks: &[RawTrack]) -> Vec<ResolvedTrack> {
    tracks.iter().map(resolve).collect()
}

/// Resolve `index` against the engine's live list for `kind`.
///
/// An index missing from the list yields a placeholder instead of an error:
/// the engine may have rebuilt its list since the index was chosen.
pub fn resolve_index(engine: &dyn MediaEngine, kind: TrackKind, index: i32) -> ResolvedTrack {
    if index == DISABLED_INDEX {
        return ResolvedTrack::disabled();
    }
    engine
        .tracks(kind)
        .iter()
        .find(|t| t.index == index)
        .map(resolve)
        .unwrap_or_else(|| {
            debug!("{} index {} not listed by the engine", kind, index);
            ResolvedTrack::placeholder(index)
        })
}

/// Resolve whichever track of `kind` is currently active
pub fn resolve_current(engine: &dyn MediaEngine, kind: TrackKind) -> ResolvedTrack {
    resolve_index(engine, kind, engine.current_index(kind))
}
