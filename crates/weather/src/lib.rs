#![deny(unsafe_code)]

/// Pure weather-query domain shared across the workspace.
///
/// This crate owns the closed category set and its keyword classifier, location
/// phrase extraction, city-record types, and the canned reply generator used as
/// offline fallback. Nothing here performs I/O.
pub mod city;
pub mod location;
pub mod mock;
pub mod pattern;

pub use city::{CityCoord, CityRecord, format_population, icon_glyph, parse_city_records};
pub use location::{DEFAULT_CENTER, DEFAULT_ZOOM, LonLat, extract_location, normalize_city_name};
pub use mock::{MockReply, mock_reply};
pub use pattern::{WeatherPattern, classify, classify_emergency, classify_exchange};
