//! Language detection from free-form track names

use regex::Regex;
use std::sync::LazyLock;

/// Language reported when nothing could be detected
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Full language names (English and native spellings) to ISO 639-1 codes
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("english", "en"),
    ("french", "fr"),
    ("francais", "fr"),
    ("français", "fr"),
    ("spanish", "es"),
    ("espanol", "es"),
    ("español", "es"),
    ("castellano", "es"),
    ("german", "de"),
    ("deutsch", "de"),
    ("italian", "it"),
    ("italiano", "it"),
    ("portuguese", "pt"),
    ("portugues", "pt"),
    ("português", "pt"),
    ("russian", "ru"),
    ("japanese", "ja"),
    ("chinese", "zh"),
    ("mandarin", "zh"),
    ("cantonese", "zh"),
    ("korean", "ko"),
    ("arabic", "ar"),
    ("hindi", "hi"),
    ("dutch", "nl"),
    ("nederlands", "nl"),
    ("swedish", "sv"),
    ("svenska", "sv"),
    ("norwegian", "no"),
    ("danish", "da"),
    ("finnish", "fi"),
    ("polish", "pl"),
    ("polski", "pl"),
    ("turkish", "tr"),
    ("greek", "el"),
    ("hebrew", "he"),
    ("czech", "cs"),
    ("hungarian", "hu"),
    ("romanian", "ro"),
    ("ukrainian", "uk"),
    ("thai", "th"),
    ("vietnamese", "vi"),
    ("indonesian", "id"),
];

/// Candidate patterns in priority order: `[xx]`, `(xx)`, leading `xx -`,
/// then any standalone two or three letter word.
static CODE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\[\s*[A-Za-z]{2,3}\s*\]",
        r"\(\s*[A-Za-z]{2,3}\s*\)",
        r"^\s*[A-Za-z]{2,3}\s*-",
        r"\b[A-Za-z]{2,3}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("language code pattern is valid"))
    .collect()
});

/// Look up a full language name, case-insensitively
pub fn code_for_name(name: &str) -> Option<&'static str> {
    let needle = name.trim().to_lowercase();
    LANGUAGE_NAMES
        .iter()
        .find(|(language, _)| *language == needle)
        .map(|(_, code)| *code)
}

/// Detect a lowercase language code from a track name.
///
/// Only the first matching pattern is considered. Without any pattern match
/// the whole name, then each of its words, is looked up as a language name.
pub fn detect_language(name: &str) -> Option<String> {
    if let Some(found) = CODE_PATTERNS.iter().find_map(|re| re.find(name)) {
        return code_from_candidate(found.as_str());
    }

    if let Some(code) = code_for_name(name) {
        return Some(code.to_string());
    }

    name.split(|c: char| !c.is_alphabetic())
        .filter(|word| !word.is_empty())
        .find_map(code_for_name)
        .map(str::to_string)
}

/// Language code for a name, or [`UNKNOWN_LANGUAGE`]
pub fn language_or_unknown(name: &str) -> String {
    detect_language(name).unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string())
}

fn code_from_candidate(candidate: &str) -> Option<String> {
    let cleaned = candidate
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();

    if (2..=3).contains(&cleaned.chars().count())
        && cleaned.chars().all(|c| c.is_ascii_alphabetic())
    {
        return Some(cleaned);
    }
    code_for_name(&cleaned).map(str::to_string)
}
