// ABOUTME: Calendarific client returning upcoming holidays and festivals for a country.
// ABOUTME: Fails open to an empty list; absence of calendar data is a valid reasoning input.

use std::time::Duration;

use chrono::{Datelike, NaiveDate, Utc};
use serde_json::Value;
use surge_core::{CalendarEvent, EventKind};

const CALENDARIFIC_URL: &str = "https://calendarific.com/api/v2";
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(8);

/// Client for the holiday/festival upstream. `get_events` never fails: a
/// missing API key, unreachable upstream, or malformed payload all return an
/// empty list.
pub struct CalendarClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    country: String,
}

impl CalendarClient {
    pub fn new(api_key: Option<String>, country: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: CALENDARIFIC_URL.to_string(),
            api_key,
            country: country.into(),
        }
    }

    /// Point the client at a different base URL. Used by tests.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Events within `[today, today + horizon_days]`, sorted by date
    /// ascending. Both calendar years are fetched when the window crosses a
    /// year boundary.
    pub async fn get_events(&self, horizon_days: u32) -> Vec<CalendarEvent> {
        let today = Utc::now().date_naive();
        let end = today + chrono::Duration::days(i64::from(horizon_days));

        let mut events = Vec::new();
        for year in today.year()..=end.year() {
            events.extend(self.fetch_year(year).await);
        }

        filter_to_window(events, today, end)
    }

    async fn fetch_year(&self, year: i32) -> Vec<CalendarEvent> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!("CALENDARIFIC_API_KEY not set, calendar tool degrades to empty");
            return Vec::new();
        };

        let url = format!("{}/holidays", self.base_url.trim_end_matches('/'));
        let year_str = year.to_string();

        let response = match self
            .http
            .get(&url)
            .timeout(UPSTREAM_TIMEOUT)
            .query(&[
                ("api_key", api_key),
                ("country", self.country.as_str()),
                ("year", year_str.as_str()),
            ])
            .send()
            .await
        {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::warn!(status = %r.status(), "calendar upstream returned non-success");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(error = %e, "calendar upstream unreachable");
                return Vec::new();
            }
        };

        match response.json::<Value>().await {
            Ok(payload) => parse_holidays_payload(&payload),
            Err(e) => {
                tracing::warn!(error = %e, "calendar upstream returned invalid JSON");
                Vec::new()
            }
        }
    }
}

/// Parse a Calendarific holidays payload into calendar events, dropping
/// entries whose type strings classify as neither holiday nor festival.
pub fn parse_holidays_payload(payload: &Value) -> Vec<CalendarEvent> {
    let Some(holidays) = payload
        .get("response")
        .and_then(|r| r.get("holidays"))
        .and_then(|h| h.as_array())
    else {
        return Vec::new();
    };

    holidays
        .iter()
        .filter_map(|holiday| {
            let name = holiday.get("name")?.as_str()?.to_string();
            let iso = holiday.get("date")?.get("iso")?.as_str()?;
            // ISO field may carry a time component; the date prefix is enough.
            let date = NaiveDate::parse_from_str(&iso[..iso.len().min(10)], "%Y-%m-%d").ok()?;

            let types: Vec<String> = holiday
                .get("type")
                .and_then(|t| t.as_array())
                .map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(str::to_lowercase))
                        .collect()
                })
                .unwrap_or_default();

            let kind = classify_event(&types)?;
            Some(CalendarEvent { name, date, kind })
        })
        .collect()
}

/// Map Calendarific type strings onto our two event kinds. Religious days and
/// observances read as festivals; civic days read as holidays.
fn classify_event(types: &[String]) -> Option<EventKind> {
    if types
        .iter()
        .any(|t| t.contains("religious") || t.contains("observance"))
    {
        return Some(EventKind::Festival);
    }
    if types
        .iter()
        .any(|t| t.contains("national") || t.contains("local") || t.contains("government"))
    {
        return Some(EventKind::Holiday);
    }
    None
}

/// Keep events inside `[today, end]`, sorted ascending by date then name,
/// with exact duplicates removed.
pub fn filter_to_window(
    mut events: Vec<CalendarEvent>,
    today: NaiveDate,
    end: NaiveDate,
) -> Vec<CalendarEvent> {
    events.retain(|e| e.date >= today && e.date <= end);
    events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
    events.dedup();
    events
}
