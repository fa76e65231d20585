// ABOUTME: Shared application state for the surgesense HTTP server.
// ABOUTME: Holds the agent; everything else is request-scoped.

use std::sync::Arc;

use surge_agent::SurgeAgent;

/// Shared state accessible by all Axum handlers. The agent is stateless
/// across requests, so independent requests can run concurrently.
pub struct AppState {
    pub agent: Arc<SurgeAgent>,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(agent: Arc<SurgeAgent>) -> Self {
        Self { agent }
    }
}
