use serde::Deserialize;
use snafu::{ResultExt, Snafu};

use skycast_weather::{DEFAULT_CENTER, LonLat};

use crate::BoxFuture;

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum GeocodeError {
    #[snafu(display("geocoding transport failed on `{stage}`: {source}"))]
    Transport {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("geocoding endpoint returned status {status} on `{stage}`"))]
    UnexpectedStatus { stage: &'static str, status: u16 },
    #[snafu(display("geocoding endpoint reported an error on `{stage}`: {reason}"))]
    Service { stage: &'static str, reason: String },
}

pub type GeocodeResult<T> = Result<T, GeocodeError>;

/// Best match returned by the geocoding service for a place name.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub name: String,
    pub coordinates: LonLat,
    pub country: Option<String>,
    pub timezone: Option<String>,
    pub population: Option<u64>,
}

/// Object-safe seam over the geocoding service so resolution logic can run
/// against a static table in tests.
pub trait Geocoder: Send + Sync {
    fn lookup<'a>(&'a self, name: &'a str) -> BoxFuture<'a, GeocodeResult<Option<GeocodedPlace>>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    latitude: f64,
    longitude: f64,
    name: String,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    population: Option<u64>,
}

/// reqwest-backed Open-Meteo geocoding client.
pub struct OpenMeteoGeocoder {
    http: reqwest::Client,
    base_url: String,
}

impl OpenMeteoGeocoder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim().trim_end_matches('/').to_string(),
        }
    }

    async fn lookup_inner(&self, name: &str) -> GeocodeResult<Option<GeocodedPlace>> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .http
            .get(url)
            .query(&[
                ("name", name),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .context(TransportSnafu {
                stage: "search-send",
            })?;

        let status = response.status();
        if !status.is_success() {
            return UnexpectedStatusSnafu {
                stage: "search-status",
                status: status.as_u16(),
            }
            .fail();
        }

        let payload: SearchResponse = response.json().await.context(TransportSnafu {
            stage: "search-decode",
        })?;

        if payload.error {
            return ServiceSnafu {
                stage: "search-payload",
                reason: payload
                    .reason
                    .unwrap_or_else(|| "unspecified geocoding error".to_string()),
            }
            .fail();
        }

        Ok(payload.results.into_iter().next().map(|result| GeocodedPlace {
            coordinates: LonLat::new(result.longitude, result.latitude),
            name: result.name,
            country: result.country,
            timezone: result.timezone,
            population: result.population,
        }))
    }
}

impl Geocoder for OpenMeteoGeocoder {
    fn lookup<'a>(&'a self, name: &'a str) -> BoxFuture<'a, GeocodeResult<Option<GeocodedPlace>>> {
        Box::pin(self.lookup_inner(name))
    }
}

/// Resolution outcome; `coordinates` is always usable by the map camera.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub name: Option<String>,
    pub coordinates: LonLat,
    pub place: Option<GeocodedPlace>,
}

impl ResolvedLocation {
    /// Default region center used when nothing could be resolved.
    pub fn fallback() -> Self {
        Self {
            name: None,
            coordinates: DEFAULT_CENTER,
            place: None,
        }
    }
}

/// Resolves an extracted location phrase to coordinates.
///
/// Every failure mode (no phrase, no match, transport error) degrades to the
/// default region center; the phrase itself is preserved as the display name
/// when one was given.
pub async fn resolve_coordinates(
    geocoder: &dyn Geocoder,
    phrase: Option<&str>,
) -> ResolvedLocation {
    let Some(phrase) = phrase else {
        return ResolvedLocation::fallback();
    };

    match geocoder.lookup(phrase).await {
        Ok(Some(place)) => ResolvedLocation {
            name: Some(place.name.clone()),
            coordinates: place.coordinates,
            place: Some(place),
        },
        Ok(None) => {
            tracing::warn!(%phrase, "geocoding found no match; using default center");
            ResolvedLocation {
                name: Some(phrase.to_string()),
                coordinates: DEFAULT_CENTER,
                place: None,
            }
        }
        Err(error) => {
            tracing::warn!(%phrase, error = %error, "geocoding failed; using default center");
            ResolvedLocation {
                name: Some(phrase.to_string()),
                coordinates: DEFAULT_CENTER,
                place: None,
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Static city table standing in for the geocoding service in tests.
    pub struct StaticGeocoder;

    const TABLE: &[(&str, f64, f64, u64)] = &[
        ("Mumbai", 72.8777, 19.0760, 12_500_000),
        ("Delhi", 77.1025, 28.7041, 11_000_000),
        ("Bangalore", 77.5946, 12.9716, 8_400_000),
        ("Hyderabad", 78.4867, 17.3850, 6_900_000),
        ("Chennai", 80.2707, 13.0827, 7_088_000),
        ("Kolkata", 88.3639, 22.5726, 4_500_000),
        ("London", -0.1278, 51.5074, 8_900_000),
        ("New York", -74.0060, 40.7128, 8_300_000),
        ("Tokyo", 139.6503, 35.6762, 13_960_000),
        ("Sydney", 151.2093, -33.8688, 5_300_000),
        ("Paris", 2.3522, 48.8566, 2_100_000),
    ];

    impl Geocoder for StaticGeocoder {
        fn lookup<'a>(
            &'a self,
            name: &'a str,
        ) -> BoxFuture<'a, GeocodeResult<Option<GeocodedPlace>>> {
            Box::pin(async move {
                let wanted = name.to_lowercase();
                Ok(TABLE
                    .iter()
                    .find(|(city, ..)| city.to_lowercase() == wanted)
                    .map(|(city, lon, lat, population)| GeocodedPlace {
                        name: (*city).to_string(),
                        coordinates: LonLat::new(*lon, *lat),
                        country: None,
                        timezone: None,
                        population: Some(*population),
                    }))
            })
        }
    }

    /// Geocoder double whose lookups always fail at the transport layer.
    pub struct OfflineGeocoder;

    impl Geocoder for OfflineGeocoder {
        fn lookup<'a>(
            &'a self,
            _name: &'a str,
        ) -> BoxFuture<'a, GeocodeResult<Option<GeocodedPlace>>> {
            Box::pin(async move {
                ServiceSnafu {
                    stage: "search-payload",
                    reason: "offline".to_string(),
                }
                .fail()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use skycast_weather::extract_location;

    use super::test_support::{OfflineGeocoder, StaticGeocoder};
    use super::*;

    fn assert_close(actual: LonLat, expected: LonLat) {
        assert!((actual.lon - expected.lon).abs() < 1e-6, "lon {actual:?} vs {expected:?}");
        assert!((actual.lat - expected.lat).abs() < 1e-6, "lat {actual:?} vs {expected:?}");
    }

    #[tokio::test]
    async fn exact_city_names_resolve_to_their_coordinates() {
        let resolved = resolve_coordinates(&StaticGeocoder, Some("Chennai")).await;
        assert_eq!(resolved.name.as_deref(), Some("Chennai"));
        assert_close(resolved.coordinates, LonLat::new(80.2707, 13.0827));
        assert!(resolved.place.is_some());
    }

    #[tokio::test]
    async fn extracted_phrases_resolve_end_to_end() {
        let phrase = extract_location("Is there a flood near Chennai?");
        let resolved = resolve_coordinates(&StaticGeocoder, phrase.as_deref()).await;
        assert_close(resolved.coordinates, LonLat::new(80.2707, 13.0827));
    }

    #[tokio::test]
    async fn aliases_resolve_through_name_normalization() {
        let phrase = extract_location("humidity in Bombay");
        assert_eq!(phrase.as_deref(), Some("Mumbai"));

        let resolved = resolve_coordinates(&StaticGeocoder, phrase.as_deref()).await;
        assert_close(resolved.coordinates, LonLat::new(72.8777, 19.0760));
    }

    #[tokio::test]
    async fn unknown_names_fall_back_to_the_default_center() {
        let resolved = resolve_coordinates(&StaticGeocoder, Some("Atlantis")).await;
        assert_eq!(resolved.name.as_deref(), Some("Atlantis"));
        assert_close(resolved.coordinates, DEFAULT_CENTER);
        assert!(resolved.place.is_none());
    }

    #[tokio::test]
    async fn missing_phrase_yields_the_anonymous_fallback() {
        let resolved = resolve_coordinates(&StaticGeocoder, None).await;
        assert_eq!(resolved, ResolvedLocation::fallback());
    }

    #[tokio::test]
    async fn transport_failures_degrade_to_the_default_center() {
        let resolved = resolve_coordinates(&OfflineGeocoder, Some("Chennai")).await;
        assert_eq!(resolved.name.as_deref(), Some("Chennai"));
        assert_close(resolved.coordinates, DEFAULT_CENTER);
    }
}
