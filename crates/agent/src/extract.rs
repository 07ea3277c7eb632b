use rig::completion::Prompt;
use rig::prelude::*;
use rig::providers::gemini;
use snafu::{ResultExt, Snafu, ensure};

use skycast_weather::{CityRecord, parse_city_records};

pub const DEFAULT_EXTRACTION_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ExtractError {
    #[snafu(display("missing extraction API key on `{stage}`"))]
    MissingApiKey { stage: &'static str },
    #[snafu(display("failed to build extraction client on `{stage}`: {source}"))]
    ClientBuild {
        stage: &'static str,
        source: rig::http_client::Error,
    },
    #[snafu(display("extraction completion failed on `{stage}`: {source}"))]
    CompletionFailed {
        stage: &'static str,
        source: rig::completion::PromptError,
    },
}

pub type ExtractResult<T> = Result<T, ExtractError>;

const EXTRACTION_PREAMBLE: &str = "You turn weather reports into structured city data. \
You answer with a JSON array only, never with prose.";

/// Derives structured city records from agent reply text through a generative
/// completion. Failures are surfaced as typed errors; callers treat them as
/// "no city data" and move on.
pub struct CityExtractor {
    api_key: String,
    model: String,
}

impl CityExtractor {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> ExtractResult<Self> {
        let api_key = api_key.into().trim().to_string();
        ensure!(
            !api_key.is_empty(),
            MissingApiKeySnafu {
                stage: "extractor-new",
            }
        );

        let model = model.into().trim().to_string();
        let model = if model.is_empty() {
            DEFAULT_EXTRACTION_MODEL.to_string()
        } else {
            model
        };

        Ok(Self { api_key, model })
    }

    /// Asks the model for the cities mentioned in `reply` and shape-checks the
    /// answer. An answer with no parseable array yields an empty list.
    pub async fn extract(&self, reply: &str) -> ExtractResult<Vec<CityRecord>> {
        let client = gemini::Client::builder()
            .api_key(&self.api_key)
            .build()
            .context(ClientBuildSnafu {
                stage: "build-client",
            })?;

        let agent = client
            .agent(&self.model)
            .preamble(EXTRACTION_PREAMBLE)
            .temperature(0.1)
            .build();

        let completion = agent
            .prompt(extraction_prompt(reply))
            .await
            .context(CompletionFailedSnafu {
                stage: "generate-city-data",
            })?;

        let records = parse_city_records(&completion);
        if records.is_empty() {
            tracing::debug!(model = %self.model, "extraction completion carried no city records");
        }

        Ok(records)
    }
}

fn extraction_prompt(reply: &str) -> String {
    format!(
        r#"Analyze the following weather response and extract any cities mentioned. For each city found, produce a JSON object:
{{
  "map_plotable": true,
  "city": "City Name",
  "coord": {{ "lat": latitude, "lon": longitude }},
  "population": population_number,
  "area": "area in km²",
  "state": "State/Province/Region",
  "climate": "Climate type",
  "tooltip": "City: temperature, weather condition",
  "icon": "weather-icon-name"
}}

Weather response: "{reply}"

Rules:
1. Only extract cities explicitly mentioned in the response.
2. Use accurate coordinates, population, area, state, and climate data.
3. Build the tooltip from the temperature and condition in the response; if unavailable use "Current weather conditions".
4. Choose the icon from: weather-sunny, weather-cloudy, weather-rainy, weather-snowy, weather-stormy, weather-foggy, weather-windy, weather-hot, weather-cold.
5. If no cities are mentioned, return an empty array.
6. Use numeric population values without separators.
7. Return only the JSON array, nothing else."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_a_blank_api_key() {
        let error = CityExtractor::new("  ", DEFAULT_EXTRACTION_MODEL)
            .expect_err("blank key must be rejected");
        assert!(matches!(error, ExtractError::MissingApiKey { .. }));
    }

    #[test]
    fn a_blank_model_falls_back_to_the_default() {
        let extractor = CityExtractor::new("key", " ").expect("extractor");
        assert_eq!(extractor.model, DEFAULT_EXTRACTION_MODEL);
    }

    #[test]
    fn prompt_embeds_the_reply_and_demands_a_bare_array() {
        let prompt = extraction_prompt("Cloudy in Pune with light rain.");
        assert!(prompt.contains("Cloudy in Pune with light rain."));
        assert!(prompt.contains("Return only the JSON array"));
        assert!(prompt.contains("weather-stormy"));
    }
}
