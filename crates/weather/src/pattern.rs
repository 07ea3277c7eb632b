use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

/// Closed category set describing the inferred weather or emergency condition.
///
/// The category drives which decorative overlay the map shows; `Default` is the
/// sentinel for text that matches no keyword family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WeatherPattern {
    Fire,
    Earthquake,
    Flood,
    Tsunami,
    Hurricane,
    Drought,
    Thunderstorm,
    Rain,
    Snow,
    Fog,
    Wind,
    Sunny,
    Cloudy,
    Hot,
    Cold,
    #[default]
    Default,
}

impl WeatherPattern {
    /// Stable lowercase label, usable as an element id fragment.
    pub fn label(self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Earthquake => "earthquake",
            Self::Flood => "flood",
            Self::Tsunami => "tsunami",
            Self::Hurricane => "hurricane",
            Self::Drought => "drought",
            Self::Thunderstorm => "thunderstorm",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Fog => "fog",
            Self::Wind => "wind",
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Hot => "hot",
            Self::Cold => "cold",
            Self::Default => "default",
        }
    }

    /// Emergency categories outrank generic weather categories everywhere.
    pub fn is_emergency(self) -> bool {
        matches!(
            self,
            Self::Fire
                | Self::Earthquake
                | Self::Flood
                | Self::Tsunami
                | Self::Hurricane
                | Self::Drought
        )
    }
}

/// Ordered keyword families. First match wins, so list order encodes priority:
/// emergency categories come before generic weather so that e.g. "storm damage
/// from the hurricane" classifies as `Hurricane`, not `Thunderstorm`.
const EMERGENCY_KEYWORDS: &[(WeatherPattern, &str)] = &[
    (
        WeatherPattern::Fire,
        r"fire|wildfire|forest fire|bushfire|flames|burning",
    ),
    (WeatherPattern::Earthquake, r"earthquake|seismic|tremor|quake"),
    (WeatherPattern::Flood, r"flood|flooding|submerged|inundated"),
    (
        WeatherPattern::Tsunami,
        r"tsunami|tidal wave|seismic sea wave",
    ),
    (
        WeatherPattern::Hurricane,
        r"hurricane|cyclone|typhoon|tropical storm",
    ),
    (
        WeatherPattern::Drought,
        r"drought|dry spell|water shortage|water scarcity|arid",
    ),
];

const WEATHER_KEYWORDS: &[(WeatherPattern, &str)] = &[
    (WeatherPattern::Thunderstorm, r"thunder|lightning|storm"),
    (
        WeatherPattern::Rain,
        r"rain|rainfall|rainy|drizzl|precipitat|shower|downpour",
    ),
    (WeatherPattern::Snow, r"snow|snowfall|blizzard|flurr"),
    (WeatherPattern::Fog, r"fog|mist|haze|smog"),
    (WeatherPattern::Wind, r"wind|windy|breeze|gust|gale"),
    (WeatherPattern::Sunny, r"\b(?:sunny|sunshine|sun)\b|clear sk"),
    (WeatherPattern::Cloudy, r"cloud|overcast|gloomy"),
    (WeatherPattern::Hot, r"\bhot\b|heat|temperature"),
    (WeatherPattern::Cold, r"\bcold\b|chill|freezing"),
];

/// Reply phrasings that indicate the asked-about emergency is NOT happening.
const NORMAL_CONDITION_PHRASES: &[&str] = &[
    r"normal conditions",
    r"clear skies",
    r"not experiencing",
    r"no sign",
    r"hasn't been",
    r"has not been",
    r"there isn't a",
    r"no\b[^.]*\breported",
    r"no\b[^.]*\bdetected",
];

struct CompiledPatterns {
    emergency: Vec<(WeatherPattern, Regex)>,
    weather: Vec<(WeatherPattern, Regex)>,
    normal_conditions: Vec<Regex>,
}

fn compiled() -> &'static CompiledPatterns {
    static PATTERNS: OnceLock<CompiledPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| CompiledPatterns {
        emergency: compile_family(EMERGENCY_KEYWORDS),
        weather: compile_family(WEATHER_KEYWORDS),
        normal_conditions: NORMAL_CONDITION_PHRASES
            .iter()
            .map(|pattern| compile(pattern))
            .collect(),
    })
}

fn compile_family(family: &[(WeatherPattern, &str)]) -> Vec<(WeatherPattern, Regex)> {
    family
        .iter()
        .map(|(label, pattern)| (*label, compile(pattern)))
        .collect()
}

fn compile(pattern: &str) -> Regex {
    // The keyword tables are compile-time constants, so a build failure here is
    // a programming error rather than a runtime condition.
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap_or_else(|error| panic!("invalid keyword pattern `{pattern}`: {error}"))
}

/// Classifies free text into a category, emergency families first.
///
/// Case-insensitive; no other normalization. Unmatched text yields the
/// `Default` sentinel.
pub fn classify(text: &str) -> WeatherPattern {
    let patterns = compiled();
    if let Some(emergency) = match_family(&patterns.emergency, text) {
        return emergency;
    }
    match_family(&patterns.weather, text).unwrap_or(WeatherPattern::Default)
}

/// Returns the first matching emergency category, if any.
pub fn classify_emergency(text: &str) -> Option<WeatherPattern> {
    match_family(&compiled().emergency, text)
}

/// True when the reply states that the asked-about condition is absent.
pub fn indicates_normal_conditions(reply: &str) -> bool {
    compiled()
        .normal_conditions
        .iter()
        .any(|pattern| pattern.is_match(reply))
}

/// Single classification entry point for a query/reply exchange.
///
/// Precedence is fixed for every caller: an emergency keyword in the query wins
/// unless the reply says conditions are normal (then `Default`); otherwise the
/// reply text is classified, falling back to the query when the reply matches
/// nothing.
pub fn classify_exchange(query: &str, reply: &str) -> WeatherPattern {
    if let Some(emergency) = classify_emergency(query) {
        if indicates_normal_conditions(reply) {
            return WeatherPattern::Default;
        }
        return emergency;
    }

    match classify(reply) {
        WeatherPattern::Default => classify(query),
        pattern => pattern,
    }
}

fn match_family(family: &[(WeatherPattern, Regex)], text: &str) -> Option<WeatherPattern> {
    family
        .iter()
        .find(|(_, regex)| regex.is_match(text))
        .map(|(label, _)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_keyword_family_resolves_to_its_category() {
        let cases = [
            ("Heavy rainfall expected through Tuesday", WeatherPattern::Rain),
            ("Lightning strikes detected near the coast", WeatherPattern::Thunderstorm),
            ("Light snowfall with 5cm accumulation", WeatherPattern::Snow),
            ("Dense fog has reduced visibility", WeatherPattern::Fog),
            ("Gusts up to 60km/h are expected", WeatherPattern::Wind),
            ("A beautiful sunny day with clear skies", WeatherPattern::Sunny),
            ("Overcast conditions with 85% cloud cover", WeatherPattern::Cloudy),
            ("A heat advisory is in effect", WeatherPattern::Hot),
            ("Freezing temperatures overnight", WeatherPattern::Cold),
            ("Low-lying areas are inundated", WeatherPattern::Flood),
            ("A bushfire is burning out of control", WeatherPattern::Fire),
            ("Tsunami warning for coastal areas", WeatherPattern::Tsunami),
            ("Day 45 of drought conditions", WeatherPattern::Drought),
            ("The typhoon is approaching landfall", WeatherPattern::Hurricane),
            ("A magnitude 5.8 tremor was recorded", WeatherPattern::Earthquake),
        ];

        for (text, expected) in cases {
            assert_eq!(classify(text), expected, "text: {text}");
        }
    }

    #[test]
    fn unmatched_text_resolves_to_default_sentinel() {
        assert_eq!(classify("tell me a joke"), WeatherPattern::Default);
        assert_eq!(classify(""), WeatherPattern::Default);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("SEVERE FLOODING REPORTED"), WeatherPattern::Flood);
        assert_eq!(classify("ThUnDeRsToRm"), WeatherPattern::Thunderstorm);
    }

    #[test]
    fn emergency_families_outrank_generic_weather() {
        // "storm" alone is Thunderstorm, but hurricane/cyclone must win.
        assert_eq!(classify("storm damage from the hurricane"), WeatherPattern::Hurricane);
        assert_eq!(classify("the tropical storm strengthened"), WeatherPattern::Hurricane);
        // "water level" phrasing near flooding keeps Flood ahead of Rain.
        assert_eq!(classify("rainfall left streets submerged"), WeatherPattern::Flood);
    }

    #[test]
    fn word_boundaries_avoid_accidental_matches() {
        assert_eq!(classify("see you on Sunday"), WeatherPattern::Default);
        assert_eq!(classify("the photo is hotly debated"), WeatherPattern::Default);
        assert_eq!(classify("laundry is done"), WeatherPattern::Default);
    }

    #[test]
    fn exchange_prefers_query_emergency_over_reply_weather() {
        let pattern = classify_exchange(
            "Is there a flood near Chennai?",
            "Heavy rain is falling and water levels are rising across Chennai.",
        );
        assert_eq!(pattern, WeatherPattern::Flood);
    }

    #[test]
    fn exchange_dampens_emergency_when_reply_reports_normal_conditions() {
        let pattern = classify_exchange(
            "Is there a wildfire near Sydney?",
            "No fire has been reported near Sydney; conditions are calm.",
        );
        assert_eq!(pattern, WeatherPattern::Default);

        let pattern = classify_exchange(
            "Any earthquake in Tokyo?",
            "Tokyo is not experiencing any seismic activity right now.",
        );
        assert_eq!(pattern, WeatherPattern::Default);
    }

    #[test]
    fn exchange_falls_back_to_query_when_reply_is_unmatched() {
        let pattern = classify_exchange("will it rain tomorrow", "I could not retrieve data.");
        assert_eq!(pattern, WeatherPattern::Rain);
    }

    #[test]
    fn exchange_classifies_reply_for_plain_weather_queries() {
        let pattern = classify_exchange(
            "what's it like in Paris",
            "Paris is experiencing overcast conditions with 85% cloud cover.",
        );
        assert_eq!(pattern, WeatherPattern::Cloudy);
    }
}
