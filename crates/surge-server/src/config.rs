// ABOUTME: Configuration loading and validation for the surgesense server.
// ABOUTME: Reads environment variables with defaults; optional API keys degrade tools, never the service.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SURGE_BIND is not a valid socket address: {0}")]
    InvalidBind(String),

    #[error("HOSPITAL_GENERATOR_INTERVAL_SEC is not a positive integer: {0}")]
    InvalidInterval(String),

    #[error("SURGE_MAX_STEPS is not a positive integer: {0}")]
    InvalidMaxSteps(String),
}

/// Server configuration loaded from environment variables. The LLM adapter
/// reads its own `LLM_*` variables separately.
#[derive(Debug, Clone)]
pub struct SurgeConfig {
    pub bind: SocketAddr,
    pub data_file: PathBuf,
    pub generator_interval_secs: u64,
    pub country_code: String,
    pub aqicn_token: Option<String>,
    pub calendarific_api_key: Option<String>,
    pub max_steps: usize,
}

impl SurgeConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - SURGE_BIND: socket address to bind (default: 127.0.0.1:8000)
    /// - HOSPITAL_DATA_FILE: snapshot document path (default: hospital_synthetic_data.json)
    /// - HOSPITAL_GENERATOR_INTERVAL_SEC: generator cadence (default: 60)
    /// - COUNTRY_CODE: calendar country (default: IN)
    /// - AQICN_TOKEN: live AQI feed token (optional; tool degrades without it)
    /// - CALENDARIFIC_API_KEY: holiday API key (optional; tool degrades without it)
    /// - SURGE_MAX_STEPS: reasoning step budget (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_str = std::env::var("SURGE_BIND").unwrap_or_else(|_| "127.0.0.1:8000".to_string());
        let bind: SocketAddr = bind_str
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_str))?;

        let data_file = std::env::var("HOSPITAL_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("hospital_synthetic_data.json"));

        let generator_interval_secs = match std::env::var("HOSPITAL_GENERATOR_INTERVAL_SEC") {
            Ok(v) => v
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidInterval(v))?,
            Err(_) => 60,
        };

        let country_code = std::env::var("COUNTRY_CODE").unwrap_or_else(|_| "IN".to_string());

        let aqicn_token = std::env::var("AQICN_TOKEN").ok().filter(|t| !t.is_empty());
        let calendarific_api_key = std::env::var("CALENDARIFIC_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        let max_steps = match std::env::var("SURGE_MAX_STEPS") {
            Ok(v) => v
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidMaxSteps(v))?,
            Err(_) => 30,
        };

        Ok(Self {
            bind,
            data_file,
            generator_interval_secs,
            country_code,
            aqicn_token,
            calendarific_api_key,
            max_steps,
        })
    }
}
