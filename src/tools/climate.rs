//! Climate tool - current weather conditions via the wttr.in JSON API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::{HandlerError, ToolHandler};

/// wttr.in base URL
const WTTR_API_URL: &str = "https://wttr.in";

/// Location used when neither params nor query name one
const DEFAULT_LOCATION: &str = "London";

/// Upstream request timeout
const HTTP_TIMEOUT_SECS: u64 = 10;

/// Weather lookup tool
pub struct ClimateTool {
    client: Client,
}

impl ClimateTool {
    pub fn new() -> Result<Self, HandlerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    /// Pick the lookup location from explicit params, then the query text,
    /// then the default
    fn resolve_location(params: &Value) -> String {
        if let Some(location) = params["location"].as_str() {
            if !location.is_empty() && location != "auto-detect" {
                return location.to_string();
            }
        }

        params["query"]
            .as_str()
            .and_then(extract_location)
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string())
    }

    /// Shape the wttr.in current_condition block into the result payload
    fn parse_current(location: &str, body: &Value) -> Result<Value, HandlerError> {
        let current = body["current_condition"].get(0).ok_or_else(|| HandlerError::Upstream {
            message: "missing current_condition".to_string(),
        })?;

        let field = |key: &str| current[key].as_str().unwrap_or("N/A").to_string();

        Ok(json!({
            "location": location,
            "data": {
                "temperature": format!("{}°C", field("temp_C")),
                "feels_like": format!("{}°C", field("FeelsLikeC")),
                "condition": current["weatherDesc"][0]["value"].as_str().unwrap_or("Unknown"),
                "humidity": format!("{}%", field("humidity")),
                "wind_speed": format!("{} km/h", field("windspeedKmph")),
                "wind_direction": field("winddir16Point"),
                "pressure": format!("{} mb", field("pressure")),
                "visibility": format!("{} km", field("visibility")),
                "uv_index": field("uvIndex")
            }
        }))
    }

    async fn fetch_current(&self, location: &str) -> Result<Value, HandlerError> {
        let url = format!("{}/{}?format=j1", WTTR_API_URL, location);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HandlerError::Upstream {
                message: format!("wttr.in returned status {}", status),
            });
        }

        let body: Value = response.json().await?;
        Self::parse_current(location, &body)
    }
}

/// Extract a location from free text of the form "... in <place>"
///
/// Takes the alphabetic words following the first standalone "in"; a word
/// with a non-alphabetic tail (e.g. "Oslo,") contributes its prefix and ends
/// the location.
fn extract_location(query: &str) -> Option<String> {
    let words: Vec<&str> = query.split_whitespace().collect();
    let position = words.iter().position(|w| w.eq_ignore_ascii_case("in"))?;

    let mut parts: Vec<String> = Vec::new();
    for word in &words[position + 1..] {
        let prefix: String = word.chars().take_while(|c| c.is_alphabetic()).collect();
        if prefix.is_empty() {
            break;
        }
        let partial = prefix.len() != word.len();
        parts.push(prefix);
        if partial {
            break;
        }
    }

    if parts.is_empty() { None } else { Some(parts.join(" ")) }
}

#[async_trait]
impl ToolHandler for ClimateTool {
    fn name(&self) -> &'static str {
        "climate"
    }

    fn description(&self) -> &'static str {
        "Look up current weather conditions for a location"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["weather", "climate", "temperature", "forecast", "rain", "sunny", "cloudy"]
    }

    async fn execute(&self, action: &str, params: &Value) -> Result<Value, HandlerError> {
        match action {
            "current" | "execute" => {
                let location = Self::resolve_location(params);
                self.fetch_current(&location).await
            }
            other => Err(HandlerError::UnknownAction {
                action: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_location_simple() {
        assert_eq!(
            extract_location("what is the weather in Paris").as_deref(),
            Some("Paris")
        );
    }

    #[test]
    fn test_extract_location_multi_word() {
        assert_eq!(
            extract_location("weather in New York today?").as_deref(),
            Some("New York today")
        );
    }

    #[test]
    fn test_extract_location_stops_at_punctuation() {
        assert_eq!(extract_location("weather in Oslo, Norway").as_deref(), Some("Oslo"));
    }

    #[test]
    fn test_extract_location_none() {
        assert!(extract_location("what is the weather").is_none());
        assert!(extract_location("").is_none());
    }

    #[test]
    fn test_extract_location_ignores_word_suffix() {
        // "rain" contains "in" but is not a standalone word
        assert!(extract_location("will it rain").is_none());
    }

    #[test]
    fn test_extract_location_skips_embedded_in() {
        assert_eq!(extract_location("rain in Spain").as_deref(), Some("Spain"));
    }

    #[test]
    fn test_resolve_location_from_params() {
        let location = ClimateTool::resolve_location(&json!({"location": "Berlin"}));
        assert_eq!(location, "Berlin");
    }

    #[test]
    fn test_resolve_location_auto_detect_falls_through() {
        let location =
            ClimateTool::resolve_location(&json!({"location": "auto-detect", "query": "weather in Rome"}));
        assert_eq!(location, "Rome");
    }

    #[test]
    fn test_resolve_location_default() {
        let location = ClimateTool::resolve_location(&json!({}));
        assert_eq!(location, DEFAULT_LOCATION);
    }

    #[test]
    fn test_parse_current() {
        let body = json!({
            "current_condition": [{
                "temp_C": "18",
                "FeelsLikeC": "17",
                "weatherDesc": [{ "value": "Partly cloudy" }],
                "humidity": "63",
                "windspeedKmph": "12",
                "winddir16Point": "NW",
                "pressure": "1014",
                "visibility": "10",
                "uvIndex": "3"
            }]
        });

        let payload = ClimateTool::parse_current("Paris", &body).unwrap();
        assert_eq!(payload["location"], "Paris");
        assert_eq!(payload["data"]["temperature"], "18°C");
        assert_eq!(payload["data"]["condition"], "Partly cloudy");
        assert_eq!(payload["data"]["wind_speed"], "12 km/h");
    }

    #[test]
    fn test_parse_current_missing_condition() {
        let err = ClimateTool::parse_current("Paris", &json!({})).unwrap_err();
        assert!(err.to_string().contains("current_condition"));
    }

    #[test]
    fn test_parse_current_missing_fields_degrade() {
        let body = json!({ "current_condition": [{}] });
        let payload = ClimateTool::parse_current("Paris", &body).unwrap();
        assert_eq!(payload["data"]["temperature"], "N/A°C");
        assert_eq!(payload["data"]["condition"], "Unknown");
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let tool = ClimateTool::new().unwrap();
        let err = tool.execute("forecast_weekly", &json!({})).await.unwrap_err();
        assert!(matches!(err, HandlerError::UnknownAction { .. }));
    }
}
