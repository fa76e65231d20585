// ABOUTME: Route definitions for the surgesense HTTP API.
// ABOUTME: Assembles the surge endpoint with CORS and tracing layers into one Router.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::SharedState;

/// Build the complete Axum router with all routes and shared state.
/// CORS is permissive: the dashboard is served from another origin.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/surge", post(api::surge::run_surge))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root banner, mirroring the dashboard's liveness probe.
async fn root() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "message": "surgesense agent API is running" }))
}

/// Health check handler. Returns 200 OK with a simple JSON body.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
