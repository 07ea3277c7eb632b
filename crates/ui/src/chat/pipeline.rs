use skycast_agent::{
    AgentApi, AgentSession, CityExtractor, Geocoder, ensure_session, resolve_coordinates,
    send_message,
};
use skycast_weather::{classify_exchange, extract_location, mock_reply};

use crate::chat::events::WeatherQueryResult;

/// What one submit produced: the (possibly refreshed) session plus the result
/// forwarded to the secondary views.
#[derive(Debug)]
pub struct QueryOutcome {
    pub session: Option<AgentSession>,
    pub result: WeatherQueryResult,
}

/// Runs the full per-query pipeline.
///
/// Agent failures degrade silently to the canned reply generator; geocoding
/// failures degrade to the default region center inside the resolver; city
/// extraction failures degrade to an empty list. The session comes back so the
/// caller can keep the id minted by a not-found retry.
pub async fn run_query(
    agent: &dyn AgentApi,
    geocoder: &dyn Geocoder,
    extractor: Option<&CityExtractor>,
    session: Option<AgentSession>,
    query: &str,
) -> QueryOutcome {
    let mut session = session;
    let agent_reply = match ensure_session(agent, session.take()).await {
        Ok(mut live) => match send_message(agent, &mut live, query).await {
            Ok(reply) => {
                session = Some(live);
                Some(reply)
            }
            Err(error) => {
                tracing::warn!(error = %error, "agent send failed; falling back to canned reply");
                session = Some(live);
                None
            }
        },
        Err(error) => {
            tracing::warn!(error = %error, "agent session creation failed; falling back to canned reply");
            None
        }
    };

    let from_agent = agent_reply.is_some();
    let (response, pattern, location_phrase) = match agent_reply {
        Some(reply) => {
            let pattern = classify_exchange(query, &reply);
            (reply, pattern, extract_location(query))
        }
        None => {
            let mock = mock_reply(query);
            (mock.response, mock.pattern, mock.location_name)
        }
    };

    let location = resolve_coordinates(geocoder, location_phrase.as_deref()).await;

    // Extraction only makes sense for genuine replies; fabricated text would
    // just produce fabricated cities.
    let cities = match extractor {
        Some(extractor) if from_agent => match extractor.extract(&response).await {
            Ok(cities) => cities,
            Err(error) => {
                tracing::warn!(error = %error, "city extraction failed; continuing without city data");
                Vec::new()
            }
        },
        _ => Vec::new(),
    };

    QueryOutcome {
        session,
        result: WeatherQueryResult {
            query: query.to_string(),
            response,
            pattern,
            location,
            cities,
        },
    }
}

#[cfg(test)]
mod tests {
    use skycast_agent::{
        AgentError, AgentEvent, AgentResult, BoxFuture, GeocodeResult, GeocodedPlace,
    };
    use skycast_weather::{DEFAULT_CENTER, LonLat, WeatherPattern};

    use super::*;

    struct CannedAgent {
        reply: Option<&'static str>,
    }

    impl AgentApi for CannedAgent {
        fn create_session<'a>(&'a self, _user_id: &'a str) -> BoxFuture<'a, AgentResult<String>> {
            Box::pin(async move {
                match self.reply {
                    Some(_) => Ok("session-1".to_string()),
                    None => Err(AgentError::UnexpectedStatus {
                        stage: "create-session-status",
                        status: 502,
                        body: "bad gateway".to_string(),
                    }),
                }
            })
        }

        fn run<'a>(
            &'a self,
            _session: &'a AgentSession,
            _message: &'a str,
        ) -> BoxFuture<'a, AgentResult<Vec<AgentEvent>>> {
            Box::pin(async move {
                match self.reply {
                    Some(reply) => {
                        Ok(serde_json::from_value(serde_json::json!([
                            { "author": "meteorologist", "content": { "parts": [{ "text": reply }] } }
                        ]))
                        .expect("canned event payload"))
                    }
                    None => Err(AgentError::UnexpectedStatus {
                        stage: "run-status",
                        status: 502,
                        body: "bad gateway".to_string(),
                    }),
                }
            })
        }
    }

    struct TableGeocoder;

    impl Geocoder for TableGeocoder {
        fn lookup<'a>(
            &'a self,
            name: &'a str,
        ) -> BoxFuture<'a, GeocodeResult<Option<GeocodedPlace>>> {
            Box::pin(async move {
                Ok(match name.to_lowercase().as_str() {
                    "chennai" => Some(GeocodedPlace {
                        name: "Chennai".to_string(),
                        coordinates: LonLat::new(80.2707, 13.0827),
                        country: Some("India".to_string()),
                        timezone: Some("Asia/Kolkata".to_string()),
                        population: Some(7_088_000),
                    }),
                    _ => None,
                })
            })
        }
    }

    #[tokio::test]
    async fn flood_query_flows_through_to_a_map_ready_result() {
        let agent = CannedAgent {
            reply: Some("EMERGENCY ALERT: Severe flooding is affecting low-lying parts of Chennai."),
        };

        let outcome = run_query(
            &agent,
            &TableGeocoder,
            None,
            None,
            "Is there a flood near Chennai?",
        )
        .await;

        assert_eq!(outcome.result.pattern, WeatherPattern::Flood);
        assert_eq!(outcome.result.location.name.as_deref(), Some("Chennai"));
        let coordinates = outcome.result.location.coordinates;
        assert!((coordinates.lon - 80.2707).abs() < 1e-6);
        assert!((coordinates.lat - 13.0827).abs() < 1e-6);
        assert!(outcome.result.response.contains("flooding"));
        assert_eq!(
            outcome.session.map(|session| session.session_id),
            Some("session-1".to_string())
        );
    }

    #[tokio::test]
    async fn normal_condition_replies_dampen_emergency_queries() {
        let agent = CannedAgent {
            reply: Some("No flooding has been reported near Chennai; conditions are normal."),
        };

        let outcome = run_query(
            &agent,
            &TableGeocoder,
            None,
            None,
            "Is there a flood near Chennai?",
        )
        .await;

        assert_eq!(outcome.result.pattern, WeatherPattern::Default);
    }

    #[tokio::test]
    async fn agent_failure_falls_back_to_the_canned_reply() {
        let agent = CannedAgent { reply: None };

        let outcome = run_query(
            &agent,
            &TableGeocoder,
            None,
            None,
            "Is there a flood near Chennai?",
        )
        .await;

        // Fabricated reply, but category and coordinates still line up.
        assert_eq!(outcome.result.pattern, WeatherPattern::Flood);
        assert!(outcome.result.response.starts_with("EMERGENCY ALERT"));
        assert!((outcome.result.location.coordinates.lon - 80.2707).abs() < 1e-6);
        assert!(outcome.result.cities.is_empty());
        assert!(outcome.session.is_none());
    }

    #[tokio::test]
    async fn unknown_locations_land_on_the_default_center() {
        let agent = CannedAgent {
            reply: Some("Light rain is expected in Ruritania overnight."),
        };

        let outcome =
            run_query(&agent, &TableGeocoder, None, None, "rain in Ruritania").await;

        assert_eq!(outcome.result.pattern, WeatherPattern::Rain);
        assert_eq!(outcome.result.location.coordinates, DEFAULT_CENTER);
        assert_eq!(outcome.result.location.name.as_deref(), Some("Ruritania"));
    }
}
