use crate::location::extract_location;
use crate::pattern::{WeatherPattern, classify};

/// Fabricated reply used when the agent backend is unreachable.
///
/// Coordinates are intentionally absent: callers resolve them through the
/// normal location path so the offline degradation stays consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct MockReply {
    pub location_name: Option<String>,
    pub pattern: WeatherPattern,
    pub response: String,
}

/// Location used in fabricated replies when the query names no place.
const FALLBACK_LOCATION: &str = "Mumbai";

/// Fabricates a plausible weather reply from the same keyword table the
/// classifier uses, keyed on the query text.
pub fn mock_reply(query: &str) -> MockReply {
    let location_name = extract_location(query);
    let place = location_name.as_deref().unwrap_or(FALLBACK_LOCATION);
    let pattern = classify(query);

    MockReply {
        response: canned_response(pattern, place),
        location_name,
        pattern,
    }
}

fn canned_response(pattern: WeatherPattern, place: &str) -> String {
    match pattern {
        WeatherPattern::Rain => format!(
            "It's currently raining in {place} with moderate intensity. Expected to continue \
             for the next 3 hours with approximately 15mm of rainfall."
        ),
        WeatherPattern::Snow => format!(
            "{place} is experiencing light snowfall. Total accumulation of about 5cm expected today."
        ),
        WeatherPattern::Sunny => format!(
            "It's a beautiful sunny day in {place} with clear skies. Current temperature is \
             24°C with UV index of 8 (high)."
        ),
        WeatherPattern::Thunderstorm => format!(
            "Severe thunderstorms are active in {place}. Lightning strikes have been detected \
             within 10km of the city center. Please stay indoors."
        ),
        WeatherPattern::Cloudy => format!(
            "{place} is experiencing overcast conditions with 85% cloud cover. No precipitation \
             expected in the next 6 hours."
        ),
        WeatherPattern::Wind => format!(
            "Strong winds of 45km/h with gusts up to 60km/h are currently affecting {place}. \
             Small craft advisory is in effect for coastal areas."
        ),
        WeatherPattern::Fog => format!(
            "Dense fog has reduced visibility to 100m in {place}. Exercise caution while \
             driving. Expected to clear by mid-morning."
        ),
        WeatherPattern::Hot => format!(
            "The current temperature in {place} is 34°C, with a feels-like temperature of 37°C \
             due to humidity. Today's high will be 38°C."
        ),
        WeatherPattern::Cold => format!(
            "A cold front is passing over {place}. Overnight lows near 2°C with wind chill \
             making it feel below freezing."
        ),
        WeatherPattern::Flood => format!(
            "EMERGENCY ALERT: {place} is experiencing severe flooding with water levels rising \
             2cm per hour. Low-lying areas are being evacuated."
        ),
        WeatherPattern::Fire => format!(
            "EMERGENCY ALERT: A wildfire is burning 15km from {place}. Smoke may affect air \
             quality; follow local evacuation advisories."
        ),
        WeatherPattern::Earthquake => format!(
            "EMERGENCY ALERT: A magnitude 5.8 earthquake was detected 30km from {place} \
             approximately 25 minutes ago. Aftershocks are likely."
        ),
        WeatherPattern::Tsunami => format!(
            "EMERGENCY ALERT: Tsunami warning issued for coastal areas near {place} following \
             a 7.2 magnitude earthquake. Move to higher ground immediately."
        ),
        WeatherPattern::Hurricane => format!(
            "EMERGENCY ALERT: A cyclone is tracking toward {place} with sustained winds of \
             120km/h. Landfall is expected within 18 hours."
        ),
        WeatherPattern::Drought => format!(
            "{place} is in day 45 of drought conditions. Water conservation measures are in \
             effect, with restrictions on non-essential water usage."
        ),
        WeatherPattern::Default => format!(
            "Current weather in {place} shows normal conditions. Temperature is 22°C with \
             moderate humidity. No extreme weather patterns detected."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fabricates_category_and_location_from_the_query() {
        let reply = mock_reply("Is there a flood near Chennai?");
        assert_eq!(reply.pattern, WeatherPattern::Flood);
        assert_eq!(reply.location_name.as_deref(), Some("Chennai"));
        assert!(reply.response.starts_with("EMERGENCY ALERT"));
        assert!(reply.response.contains("Chennai"));
    }

    #[test]
    fn falls_back_to_the_default_location_in_text_only() {
        let reply = mock_reply("will it rain tomorrow");
        assert_eq!(reply.pattern, WeatherPattern::Rain);
        assert_eq!(reply.location_name, None);
        assert!(reply.response.contains(FALLBACK_LOCATION));
    }

    #[test]
    fn unmatched_queries_get_the_default_sentinel_reply() {
        let reply = mock_reply("hello there");
        assert_eq!(reply.pattern, WeatherPattern::Default);
        assert!(reply.response.contains("normal conditions"));
    }

    #[test]
    fn mock_category_agrees_with_the_shared_classifier() {
        // One table drives both; the mock must never drift from `classify`.
        for query in [
            "thunderstorms near Delhi",
            "is it snowing in Shimla",
            "any wildfire warnings",
            "drought outlook for Pune",
        ] {
            assert_eq!(mock_reply(query).pattern, classify(query));
        }
    }
}
