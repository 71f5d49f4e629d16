use super::ResolvedTrack;
use crate::engine::{DISABLED_INDEX, TrackKind};
use serde::{Deserialize, Serialize};

/// Track ids that always mean "turn this kind off"
pub const DISABLED_TRACK_IDS: [&str; 2] = ["off", "#disabled"];

/// Host preferences for one track kind, fixed for the whole session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPreference {
    pub track_id: Option<String>,
    pub locale: Option<String>,
    /// Audio only: tried when `locale` is absent or matched nothing
    pub fallback_locale: Option<String>,
}

impl SelectionPreference {
    /// Build a preference, treating blank strings as absent
    pub fn new(
        track_id: Option<&str>,
        locale: Option<&str>,
        fallback_locale: Option<&str>,
    ) -> Self {
        Self {
            track_id: non_blank(track_id),
            locale: non_blank(locale),
            fallback_locale: non_blank(fallback_locale),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.track_id.is_none() && self.locale.is_none() && self.fallback_locale.is_none()
    }

    pub fn wants_disabled(&self) -> bool {
        self.track_id
            .as_deref()
            .is_some_and(|id| DISABLED_TRACK_IDS.contains(&id))
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Preferences for both kinds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackPreferences {
    pub audio: SelectionPreference,
    pub subtitle: SelectionPreference,
}

impl TrackPreferences {
    pub fn for_kind(&self, kind: TrackKind) -> &SelectionPreference {
        match kind {
            TrackKind::Audio => &self.audio,
            TrackKind::Subtitle => &self.subtitle,
        }
    }
}

/// Track the policy decided to activate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackChoice {
    pub index: i32,
    pub id: String,
}

impl TrackChoice {
    pub fn disabled() -> Self {
        Self {
            index: DISABLED_INDEX,
            id: DISABLED_INDEX.to_string(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.index == DISABLED_INDEX
    }

    fn from_track(track: &ResolvedTrack) -> Option<Self> {
        track.index().map(|index| Self {
            index,
            id: track.id.clone(),
        })
    }
}

pub fn select_audio(tracks: &[ResolvedTrack], pref: &SelectionPreference) -> Option<TrackChoice> {
    select(tracks, pref, true)
}

/// Same rules as audio, without the fallback locale tier
pub fn select_subtitle(
    tracks: &[ResolvedTrack],
    pref: &SelectionPreference,
) -> Option<TrackChoice> {
    select(tracks, pref, false)
}

pub fn select_for(
    kind: TrackKind,
    tracks: &[ResolvedTrack],
    pref: &SelectionPreference,
) -> Option<TrackChoice> {
    match kind {
        TrackKind::Audio => select_audio(tracks, pref),
        TrackKind::Subtitle => select_subtitle(tracks, pref),
    }
}

fn select(
    tracks: &[ResolvedTrack],
    pref: &SelectionPreference,
    use_fallback: bool,
) -> Option<TrackChoice> {
    if tracks.is_empty() {
        return None;
    }
    if pref.wants_disabled() {
        return Some(TrackChoice::disabled());
    }

    // An explicit id that matches nothing does not fall back to locales
    if let Some(wanted) = pref.track_id.as_deref() {
        return tracks
            .iter()
            .find(|t| t.label == wanted || t.id == wanted)
            .and_then(TrackChoice::from_track);
    }

    let fallback = if use_fallback {
        pref.fallback_locale.as_deref()
    } else {
        None
    };

    [pref.locale.as_deref(), fallback]
        .into_iter()
        .flatten()
        .find_map(|locale| by_language(tracks, locale))
}

fn by_language(tracks: &[ResolvedTrack], locale: &str) -> Option<TrackChoice> {
    let locale = locale.to_lowercase();
    tracks
        .iter()
        .find(|t| t.language == locale)
        .and_then(TrackChoice::from_track)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RawTrack;
    use crate::tracks::resolve_all;

    fn tracks(raw: &[(i32, &str)]) -> Vec<ResolvedTrack> {
        let raw: Vec<RawTrack> = raw.iter().map(|(i, n)| RawTrack::new(*i, *n)).collect();
        resolve_all(&raw)
    }

    fn locale(value: &str) -> SelectionPreference {
        SelectionPreference::new(None, Some(value), None)
    }

    #[test]
    fn test_locale_selects_first_match() {
        let list = tracks(&[(0, "English"), (1, "[FR] French"), (2, "Spanish (es)")]);
        let choice = select_audio(&list, &locale("fr")).unwrap();
        assert_eq!(choice.index, 1);
        assert_eq!(choice.id, "1");
    }

    #[test]
    fn test_locale_is_lowercased() {
        let list = tracks(&[(0, "English"), (1, "[FR] French")]);
        assert_eq!(select_subtitle(&list, &locale("FR")).unwrap().index, 1);
    }

    #[test]
    fn test_no_detectable_language_selects_nothing() {
        let list = tracks(&[(0, "Track 1"), (1, "Track 2")]);
        assert_eq!(select_audio(&list, &locale("fr")), None);
    }

    #[test]
    fn test_track_id_beats_locale() {
        let list = tracks(&[(0, "[FR] French"), (2, "English")]);
        let pref = SelectionPreference::new(Some("2"), Some("fr"), None);
        assert_eq!(select_audio(&list, &pref).unwrap().index, 2);
    }

    #[test]
    fn test_track_id_matches_label() {
        let list = tracks(&[(0, "English"), (4, "Director Commentary")]);
        let pref = SelectionPreference::new(Some("Director Commentary"), None, None);
        assert_eq!(select_subtitle(&list, &pref).unwrap().index, 4);
    }

    #[test]
    fn test_unmatched_track_id_does_not_fall_back() {
        let list = tracks(&[(0, "[FR] French")]);
        let pref = SelectionPreference::new(Some("9"), Some("fr"), Some("fr"));
        assert_eq!(select_audio(&list, &pref), None);
    }

    #[test]
    fn test_off_always_disables() {
        let list = tracks(&[(0, "[FR] French")]);
        for id in ["off", "#disabled"] {
            let pref = SelectionPreference::new(Some(id), Some("fr"), Some("fr"));
            assert_eq!(select_subtitle(&list, &pref), Some(TrackChoice::disabled()));
            assert_eq!(select_audio(&list, &pref), Some(TrackChoice::disabled()));
        }
    }

    #[test]
    fn test_fallback_locale_is_audio_only() {
        let list = tracks(&[(0, "English"), (1, "German")]);
        let pref = SelectionPreference::new(None, Some("fr"), Some("de"));
        assert_eq!(select_audio(&list, &pref).unwrap().index, 1);
        assert_eq!(select_subtitle(&list, &pref), None);
    }

    #[test]
    fn test_locale_match_preferred_over_fallback() {
        let list = tracks(&[(0, "English"), (1, "German")]);
        let pref = SelectionPreference::new(None, Some("en"), Some("de"));
        assert_eq!(select_audio(&list, &pref).unwrap().index, 0);
    }

    #[test]
    fn test_empty_tracks_is_noop() {
        assert_eq!(select_audio(&[], &locale("en")), None);
        assert_eq!(select_subtitle(&[], &SelectionPreference::new(Some("1"), None, None)), None);
    }

    #[test]
    fn test_off_without_tracks_is_noop() {
        let pref = SelectionPreference::new(Some("off"), None, None);
        assert_eq!(select_subtitle(&[], &pref), None);
    }

    #[test]
    fn test_selection_is_idempotent() {
        let list = tracks(&[(0, "English"), (1, "[FR] French")]);
        let pref = locale("fr");
        assert_eq!(select_audio(&list, &pref), select_audio(&list, &pref));
    }

    #[test]
    fn test_blank_values_are_absent() {
        let pref = SelectionPreference::new(Some("  "), Some(""), None);
        assert!(pref.is_empty());
    }
}
