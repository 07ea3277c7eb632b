use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

/// A longitude/latitude pair. Longitude first, matching the wire order used by
/// the map camera and the geocoding fallbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Default region center used whenever no location can be resolved.
pub const DEFAULT_CENTER: LonLat = LonLat::new(78.9629, 22.5937);
/// Zoom level paired with [`DEFAULT_CENTER`].
pub const DEFAULT_ZOOM: f64 = 5.0;

/// Prepositional phrases scanned in order; the first capture wins.
const PREPOSITION_PATTERNS: &[&str] = &[
    r"\bnear\s+([a-zA-Z][a-zA-Z\s,]*)",
    r"\bin\s+([a-zA-Z][a-zA-Z\s,]*)",
    r"\bat\s+([a-zA-Z][a-zA-Z\s,]*)",
    r"\bfor\s+([a-zA-Z][a-zA-Z\s,]*)",
];

/// Bare city names recognized without a preposition.
const KNOWN_CITIES: &[&str] = &[
    "mumbai",
    "delhi",
    "bangalore",
    "hyderabad",
    "chennai",
    "kolkata",
    "london",
    "new york",
    "tokyo",
    "sydney",
    "paris",
];

/// Historical/alternate names folded into the canonical spelling.
const CITY_ALIASES: &[(&str, &str)] = &[
    ("bombay", "Mumbai"),
    ("calcutta", "Kolkata"),
    ("madras", "Chennai"),
    ("bengaluru", "Bangalore"),
];

/// Trailing words that are part of the question, not the place name.
const TRAILING_NOISE: &[&str] = &[
    "today", "tomorrow", "tonight", "now", "currently", "right", "please", "this", "week",
    "weekend", "morning", "evening",
];

struct CompiledExtraction {
    prepositions: Vec<Regex>,
    known_cities: Regex,
}

fn compiled() -> &'static CompiledExtraction {
    static EXTRACTION: OnceLock<CompiledExtraction> = OnceLock::new();
    EXTRACTION.get_or_init(|| {
        let known = KNOWN_CITIES.join("|");
        CompiledExtraction {
            prepositions: PREPOSITION_PATTERNS.iter().map(|p| compile(p)).collect(),
            known_cities: compile(&format!(r"\b({known})\b")),
        }
    })
}

fn compile(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap_or_else(|error| panic!("invalid location pattern `{pattern}`: {error}"))
}

/// Extracts a best-effort location name from free text.
///
/// Prepositional phrases ("near X", "in X", ...) are tried first; a bare known
/// city name is the fallback. Captures are trimmed, stripped of trailing
/// question noise, reduced to a known city when one is embedded, and alias
/// spellings are normalized. Returns `None` when nothing plausible is found.
pub fn extract_location(text: &str) -> Option<String> {
    let patterns = compiled();

    for preposition in &patterns.prepositions {
        if let Some(capture) = preposition.captures(text).and_then(|c| c.get(1)) {
            if let Some(name) = tidy_capture(capture.as_str()) {
                return Some(name);
            }
        }
    }

    patterns
        .known_cities
        .find(text)
        .map(|hit| normalize_city_name(hit.as_str()))
}

/// Canonicalizes capitalization and resolves alias spellings.
pub fn normalize_city_name(name: &str) -> String {
    let trimmed = name.trim().trim_matches(',').trim();
    let lowered = trimmed.to_lowercase();

    for (alias, canonical) in CITY_ALIASES {
        if lowered == *alias {
            return (*canonical).to_string();
        }
    }

    title_case(trimmed)
}

fn tidy_capture(capture: &str) -> Option<String> {
    let trimmed = capture.trim().trim_matches(',').trim();
    if trimmed.is_empty() {
        return None;
    }

    // If a known city is embedded in the capture ("London today"), prefer it.
    if let Some(hit) = compiled().known_cities.find(trimmed) {
        return Some(normalize_city_name(hit.as_str()));
    }

    let mut words: Vec<&str> = trimmed.split_whitespace().collect();
    while let Some(last) = words.last() {
        if TRAILING_NOISE.contains(&last.to_lowercase().as_str()) {
            words.pop();
        } else {
            break;
        }
    }

    if words.is_empty() {
        return None;
    }

    Some(normalize_city_name(&words.join(" ")))
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_prepositional_phrases() {
        assert_eq!(extract_location("Is there a flood near Chennai?"), Some("Chennai".into()));
        assert_eq!(extract_location("what's the weather in London today"), Some("London".into()));
        assert_eq!(extract_location("forecast for new york"), Some("New York".into()));
        assert_eq!(extract_location("conditions at Pune right now"), Some("Pune".into()));
    }

    #[test]
    fn extracts_bare_known_city_names() {
        assert_eq!(extract_location("mumbai weather?"), Some("Mumbai".into()));
        assert_eq!(extract_location("how hot is tokyo"), Some("Tokyo".into()));
    }

    #[test]
    fn near_outranks_in_when_both_are_present() {
        assert_eq!(
            extract_location("in the monsoon season, any flooding near Kolkata?"),
            Some("Kolkata".into())
        );
    }

    #[test]
    fn aliases_normalize_to_canonical_spelling() {
        assert_eq!(extract_location("humidity in Bombay"), Some("Mumbai".into()));
        assert_eq!(extract_location("rain near calcutta"), Some("Kolkata".into()));
        assert_eq!(normalize_city_name("MADRAS"), "Chennai");
    }

    #[test]
    fn trailing_question_noise_is_stripped() {
        assert_eq!(extract_location("snow in Shimla this weekend"), Some("Shimla".into()));
        assert_eq!(extract_location("wind speed for Jaipur please"), Some("Jaipur".into()));
    }

    #[test]
    fn unmatched_text_yields_none() {
        assert_eq!(extract_location("tell me a joke"), None);
        assert_eq!(extract_location(""), None);
        assert_eq!(extract_location("what is the weather like"), None);
    }
}
