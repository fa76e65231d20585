// ABOUTME: HTTP server for surgesense, exposing the surge-assessment endpoint.
// ABOUTME: Uses Axum with shared agent state, permissive CORS, and request tracing.

pub mod api;
pub mod app_state;
pub mod config;
pub mod routes;

pub use app_state::{AppState, SharedState};
pub use config::{ConfigError, SurgeConfig};
pub use routes::create_router;
