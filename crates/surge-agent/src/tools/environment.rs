// ABOUTME: Tool wrapping the environment client: weather and AQI for a city.
// ABOUTME: Upstream failures degrade to a partial reading with absent fields.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{Tool, failure, success};
use crate::clients::{EnvironmentClient, classify_aqi};

/// Tool returning a normalized environment reading for a city.
/// Input shape: `{"city": "<name>"}`.
pub struct EnvironmentTool {
    client: Arc<EnvironmentClient>,
}

impl EnvironmentTool {
    pub fn new(client: Arc<EnvironmentClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for EnvironmentTool {
    fn name(&self) -> &str {
        "get_environment_tool"
    }

    fn description(&self) -> &str {
        "Get environment conditions (peak temperature, total rainfall, AQI) for a city. \
         Input MUST be a JSON object like {\"city\": \"Mumbai\"}."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "Name of the city to fetch environment data for."
                }
            },
            "required": ["city"]
        })
    }

    async fn call(&self, input: &Value) -> String {
        let Some(city) = input.get("city").and_then(|c| c.as_str()) else {
            return failure(r#"input must be a JSON object like {"city": "Mumbai"}"#);
        };
        let city = city.trim();
        if city.is_empty() {
            return failure("city must not be empty");
        }

        let reading = self.client.get_environment(city).await;
        let aqi_band = classify_aqi(reading.aqi);

        match serde_json::to_value(&reading) {
            Ok(mut data) => {
                data["aqi_band"] = json!(aqi_band);
                success(data)
            }
            Err(e) => failure(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_tool() -> EnvironmentTool {
        let client = EnvironmentClient::new(None).with_upstreams(
            "http://127.0.0.1:1/geocode".to_string(),
            "http://127.0.0.1:1/forecast".to_string(),
            "http://127.0.0.1:1/air-quality".to_string(),
            "http://127.0.0.1:1".to_string(),
        );
        EnvironmentTool::new(Arc::new(client))
    }

    #[tokio::test]
    async fn unreachable_upstream_returns_null_aqi_reading() {
        let tool = unreachable_tool();
        let observation = tool.call(&json!({"city": "Mumbai"})).await;
        let parsed: Value = serde_json::from_str(&observation).unwrap();

        assert_eq!(parsed["status"], "success");
        assert_eq!(parsed["data"]["city"], "Mumbai");
        assert!(parsed["data"]["aqi"].is_null());
        assert_eq!(parsed["data"]["aqi_band"], "Unknown");
    }

    #[tokio::test]
    async fn missing_city_is_an_input_error() {
        let tool = unreachable_tool();
        let observation = tool.call(&json!({})).await;
        let parsed: Value = serde_json::from_str(&observation).unwrap();

        assert_eq!(parsed["status"], "error");
        assert!(parsed["message"].as_str().unwrap().contains("city"));
    }

    #[tokio::test]
    async fn blank_city_is_an_input_error() {
        let tool = unreachable_tool();
        let observation = tool.call(&json!({"city": "  "})).await;
        let parsed: Value = serde_json::from_str(&observation).unwrap();
        assert_eq!(parsed["status"], "error");
    }
}
