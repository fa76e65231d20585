// ABOUTME: Weather and air-quality client: Open-Meteo geocoding/forecast/air-quality,
// ABOUTME: plus an optional live AQICN feed. Always returns a best-effort partial reading.

use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use surge_core::EnvironmentReading;

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";
const AQICN_URL: &str = "https://api.waqi.info";
const FORECAST_DAYS: u32 = 5;
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(8);

/// Qualitative AQI band, following the standard index breakpoints.
pub fn classify_aqi(value: Option<u32>) -> &'static str {
    match value {
        None => "Unknown",
        Some(v) if v <= 50 => "Good",
        Some(v) if v <= 100 => "Moderate",
        Some(v) if v <= 150 => "Unhealthy for Sensitive Groups",
        Some(v) if v <= 200 => "Unhealthy",
        Some(v) if v <= 300 => "Very Unhealthy",
        Some(_) => "Hazardous",
    }
}

/// Client for weather and air-quality upstreams. Every fetch is fail-open:
/// an unreachable or non-success upstream degrades the affected fields to
/// `None` instead of raising, because the reasoning loop has no structured
/// recovery path for a raised tool error.
pub struct EnvironmentClient {
    http: reqwest::Client,
    geocoding_url: String,
    forecast_url: String,
    air_quality_url: String,
    aqicn_url: String,
    aqicn_token: Option<String>,
}

#[derive(Debug, Clone)]
struct Geocoded {
    latitude: f64,
    longitude: f64,
    resolved_name: String,
}

impl EnvironmentClient {
    pub fn new(aqicn_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            geocoding_url: GEOCODING_URL.to_string(),
            forecast_url: FORECAST_URL.to_string(),
            air_quality_url: AIR_QUALITY_URL.to_string(),
            aqicn_url: AQICN_URL.to_string(),
            aqicn_token,
        }
    }

    /// Point every upstream at the given base URLs. Used by tests to simulate
    /// unreachable upstreams.
    pub fn with_upstreams(
        mut self,
        geocoding_url: String,
        forecast_url: String,
        air_quality_url: String,
        aqicn_url: String,
    ) -> Self {
        self.geocoding_url = geocoding_url;
        self.forecast_url = forecast_url;
        self.air_quality_url = air_quality_url;
        self.aqicn_url = aqicn_url;
        self
    }

    /// Fetch a normalized reading for the city: peak temperature and summed
    /// precipitation over the forecast window, and an AQI (live feed
    /// preferred, forecast fallback). Missing upstreams leave fields `None`.
    pub async fn get_environment(&self, city: &str) -> EnvironmentReading {
        let mut reading = EnvironmentReading::unavailable(city);

        let geocoded = self.geocode(city).await;
        if let Some(place) = &geocoded {
            reading.city = place.resolved_name.clone();

            if let Some((temperature_c, precipitation_mm)) =
                self.forecast(place.latitude, place.longitude).await
            {
                reading.temperature_c = temperature_c;
                reading.precipitation_mm = precipitation_mm;
            }
        } else {
            tracing::warn!(city, "geocoding unavailable, returning partial reading");
        }

        reading.aqi = match self.live_aqi(city).await {
            Some(aqi) => Some(aqi),
            None => match &geocoded {
                Some(place) => self.forecast_aqi(place.latitude, place.longitude).await,
                None => None,
            },
        };

        reading.timestamp = Utc::now();
        reading
    }

    async fn geocode(&self, city: &str) -> Option<Geocoded> {
        let payload = self
            .get_json(&self.geocoding_url, &[("name", city), ("count", "1")])
            .await?;

        let result = payload.get("results")?.as_array()?.first()?.clone();
        Some(Geocoded {
            latitude: result.get("latitude")?.as_f64()?,
            longitude: result.get("longitude")?.as_f64()?,
            resolved_name: result
                .get("name")
                .and_then(|n| n.as_str())
                .unwrap_or(city)
                .to_string(),
        })
    }

    /// Returns (peak daily max temperature, total precipitation) over the window.
    async fn forecast(&self, latitude: f64, longitude: f64) -> Option<(Option<f64>, Option<f64>)> {
        let lat = latitude.to_string();
        let lon = longitude.to_string();
        let days = FORECAST_DAYS.to_string();
        let payload = self
            .get_json(
                &self.forecast_url,
                &[
                    ("latitude", lat.as_str()),
                    ("longitude", lon.as_str()),
                    ("forecast_days", days.as_str()),
                    ("daily", "temperature_2m_max,precipitation_sum"),
                ],
            )
            .await?;

        let daily = payload.get("daily")?;
        let temperature_c = daily
            .get("temperature_2m_max")
            .and_then(|v| v.as_array())
            .and_then(|temps| temps.iter().filter_map(|t| t.as_f64()).reduce(f64::max));
        let precipitation_mm = daily
            .get("precipitation_sum")
            .and_then(|v| v.as_array())
            .map(|sums| sums.iter().filter_map(|s| s.as_f64()).sum());

        Some((temperature_c, precipitation_mm))
    }

    async fn forecast_aqi(&self, latitude: f64, longitude: f64) -> Option<u32> {
        let lat = latitude.to_string();
        let lon = longitude.to_string();
        let payload = self
            .get_json(
                &self.air_quality_url,
                &[
                    ("latitude", lat.as_str()),
                    ("longitude", lon.as_str()),
                    ("hourly", "european_aqi"),
                ],
            )
            .await?;

        payload
            .get("hourly")?
            .get("european_aqi")?
            .as_array()?
            .first()?
            .as_f64()
            .map(|v| v.round() as u32)
    }

    async fn live_aqi(&self, city: &str) -> Option<u32> {
        let token = self.aqicn_token.as_deref()?;
        let url = format!("{}/feed/{}/", self.aqicn_url.trim_end_matches('/'), city);
        let payload = self.get_json(&url, &[("token", token)]).await?;

        if payload.get("status").and_then(|s| s.as_str()) != Some("ok") {
            return None;
        }

        payload
            .get("data")?
            .get("aqi")?
            .as_f64()
            .map(|v| v.round() as u32)
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Option<Value> {
        let response = self
            .http
            .get(url)
            .timeout(UPSTREAM_TIMEOUT)
            .query(query)
            .send()
            .await
            .map_err(|e| tracing::warn!(url, error = %e, "environment upstream unreachable"))
            .ok()?;

        if !response.status().is_success() {
            tracing::warn!(url, status = %response.status(), "environment upstream returned non-success");
            return None;
        }

        response
            .json()
            .await
            .map_err(|e| tracing::warn!(url, error = %e, "environment upstream returned invalid JSON"))
            .ok()
    }
}
