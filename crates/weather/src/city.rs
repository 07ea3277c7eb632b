use serde::{Deserialize, Serialize};

/// Latitude/longitude pair as produced by the extraction service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CityCoord {
    pub lat: f64,
    pub lon: f64,
}

/// Structured city data derived from agent reply text.
///
/// Shape-checked only: records are accepted field-by-field with defaults, and a
/// record that fails to deserialize is skipped rather than failing the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    #[serde(default)]
    pub map_plotable: bool,
    pub city: String,
    pub coord: CityCoord,
    #[serde(default)]
    pub population: Option<u64>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub climate: Option<String>,
    #[serde(default)]
    pub tooltip: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl CityRecord {
    /// True for records the map panel should render.
    pub fn is_plottable(&self) -> bool {
        self.map_plotable
    }
}

/// Parses the first JSON array embedded in generated text into city records.
///
/// The extraction model is prompted to answer with a bare array, but replies
/// routinely carry surrounding prose or code fences; everything outside the
/// outermost `[...]` span is ignored. Malformed spans and malformed individual
/// records yield an empty/partial list, never an error.
pub fn parse_city_records(text: &str) -> Vec<CityRecord> {
    let Some(start) = text.find('[') else {
        return Vec::new();
    };
    let Some(end) = text.rfind(']') else {
        return Vec::new();
    };
    if end <= start {
        return Vec::new();
    }

    let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(&text[start..=end]) else {
        return Vec::new();
    };

    values
        .into_iter()
        .filter_map(|value| serde_json::from_value::<CityRecord>(value).ok())
        .collect()
}

/// Maps the extraction service's icon tag onto a display glyph.
pub fn icon_glyph(icon: Option<&str>) -> &'static str {
    match icon {
        Some("weather-sunny") => "☀️",
        Some("weather-cloudy") => "☁️",
        Some("weather-rainy") => "🌧️",
        Some("weather-snowy") => "❄️",
        Some("weather-stormy") => "⛈️",
        Some("weather-foggy") => "🌫️",
        Some("weather-windy") => "💨",
        Some("weather-hot") => "🌡️",
        Some("weather-cold") => "🥶",
        _ => "🌤️",
    }
}

/// Formats a population count with thousands separators for info cards.
pub fn format_population(population: u64) -> String {
    let digits = population.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RECORD: &str = r#"{
        "map_plotable": true,
        "city": "Chennai",
        "coord": { "lat": 13.0827, "lon": 80.2707 },
        "population": 7088000,
        "area": "426 km²",
        "state": "Tamil Nadu",
        "climate": "Tropical wet and dry",
        "tooltip": "Chennai: 31°C, humid",
        "icon": "weather-rainy"
    }"#;

    #[test]
    fn parses_a_bare_json_array() {
        let records = parse_city_records(&format!("[{SAMPLE_RECORD}]"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].city, "Chennai");
        assert_eq!(records[0].coord.lon, 80.2707);
        assert_eq!(records[0].population, Some(7_088_000));
        assert!(records[0].is_plottable());
    }

    #[test]
    fn ignores_prose_and_code_fences_around_the_array() {
        let text = format!("Here are the cities:\n```json\n[{SAMPLE_RECORD}]\n```\nDone.");
        let records = parse_city_records(&text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].state.as_deref(), Some("Tamil Nadu"));
    }

    #[test]
    fn malformed_payloads_yield_an_empty_list() {
        assert!(parse_city_records("no array here").is_empty());
        assert!(parse_city_records("[{ not json ]").is_empty());
        assert!(parse_city_records("]...[").is_empty());
        assert!(parse_city_records(r#"{"city": "Pune"}"#).is_empty());
    }

    #[test]
    fn records_missing_required_fields_are_skipped_individually() {
        let text = format!(r#"[{SAMPLE_RECORD}, {{"city": "Nowhere"}}]"#);
        let records = parse_city_records(&text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].city, "Chennai");
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let records =
            parse_city_records(r#"[{"city": "Pune", "coord": {"lat": 18.52, "lon": 73.85}}]"#);
        assert_eq!(records.len(), 1);
        assert!(!records[0].map_plotable);
        assert_eq!(records[0].population, None);
        assert_eq!(records[0].icon, None);
    }

    #[test]
    fn icon_tags_map_to_glyphs_with_a_fallback() {
        assert_eq!(icon_glyph(Some("weather-stormy")), "⛈️");
        assert_eq!(icon_glyph(Some("weather-unknown")), "🌤️");
        assert_eq!(icon_glyph(None), "🌤️");
    }

    #[test]
    fn population_formatting_groups_thousands() {
        assert_eq!(format_population(7), "7");
        assert_eq!(format_population(950), "950");
        assert_eq!(format_population(7088), "7,088");
        assert_eq!(format_population(7_088_000), "7,088,000");
        assert_eq!(format_population(12_500_000), "12,500,000");
    }
}
