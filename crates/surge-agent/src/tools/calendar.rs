// ABOUTME: Tool wrapping the calendar client: upcoming holidays and festivals.
// ABOUTME: Reports the queried window alongside the (possibly empty) event list.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};

use super::{Tool, failure, success};
use crate::clients::CalendarClient;

const DEFAULT_DAYS_AHEAD: u32 = 30;
const MAX_DAYS_AHEAD: u32 = 365;

/// Tool returning upcoming public holidays and festivals within a
/// forward-looking window. Input shape: `{"days_ahead": <int>}`, default 30.
pub struct CalendarEventsTool {
    client: Arc<CalendarClient>,
}

impl CalendarEventsTool {
    pub fn new(client: Arc<CalendarClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CalendarEventsTool {
    fn name(&self) -> &str {
        "get_calendar_events_tool"
    }

    fn description(&self) -> &str {
        "Get upcoming public holidays and festivals for the next N days. \
         Input MUST be a JSON object like {\"days_ahead\": 30}."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "days_ahead": {
                    "type": "integer",
                    "description": "Number of days from today to look ahead for holidays/festivals. Defaults to 30."
                }
            },
            "required": []
        })
    }

    async fn call(&self, input: &Value) -> String {
        let days_ahead = match input.get("days_ahead") {
            None | Some(Value::Null) => DEFAULT_DAYS_AHEAD,
            Some(v) => match v.as_u64() {
                Some(n) if n <= u64::from(MAX_DAYS_AHEAD) => n as u32,
                _ => {
                    return failure(format!(
                        "days_ahead must be an integer between 0 and {}",
                        MAX_DAYS_AHEAD
                    ));
                }
            },
        };

        let today = Utc::now().date_naive();
        let to_date = today + chrono::Duration::days(i64::from(days_ahead));
        let events = self.client.get_events(days_ahead).await;
        let window_is_empty = events.is_empty();

        let mut data = json!({
            "from_date": today.to_string(),
            "to_date": to_date.to_string(),
            "events": events,
        });
        if window_is_empty {
            data["message"] = json!("No festivals or holidays in the selected window.");
        }

        success(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_tool() -> CalendarEventsTool {
        // No API key: the client fails open to an empty list without network calls.
        CalendarEventsTool::new(Arc::new(CalendarClient::new(None, "IN")))
    }

    #[tokio::test]
    async fn empty_window_reports_dates_and_message() {
        let tool = offline_tool();
        let observation = tool.call(&json!({"days_ahead": 5})).await;
        let parsed: Value = serde_json::from_str(&observation).unwrap();

        assert_eq!(parsed["status"], "success");
        assert!(parsed["data"]["events"].as_array().unwrap().is_empty());
        assert!(parsed["data"]["message"].as_str().is_some());

        let from = parsed["data"]["from_date"].as_str().unwrap();
        let to = parsed["data"]["to_date"].as_str().unwrap();
        assert!(from < to);
    }

    #[tokio::test]
    async fn days_ahead_defaults_when_omitted() {
        let tool = offline_tool();
        let observation = tool.call(&json!({})).await;
        let parsed: Value = serde_json::from_str(&observation).unwrap();
        assert_eq!(parsed["status"], "success");
    }

    #[tokio::test]
    async fn negative_days_ahead_is_an_input_error() {
        let tool = offline_tool();
        let observation = tool.call(&json!({"days_ahead": -3})).await;
        let parsed: Value = serde_json::from_str(&observation).unwrap();
        assert_eq!(parsed["status"], "error");
    }

    #[tokio::test]
    async fn oversized_days_ahead_is_an_input_error() {
        let tool = offline_tool();
        let observation = tool.call(&json!({"days_ahead": 5000})).await;
        let parsed: Value = serde_json::from_str(&observation).unwrap();
        assert_eq!(parsed["status"], "error");
    }
}
