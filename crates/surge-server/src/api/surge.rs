// ABOUTME: The POST /surge handler: runs the reasoning loop for one question.
// ABOUTME: Tool and model failures are absorbed into the 200 body, never the status code.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use surge_core::{AgentOutput, ToolInvocation};
use ulid::Ulid;

use crate::app_state::SharedState;

/// Request body for POST /surge. A missing `query` fails extraction and
/// yields a 4xx before any tool runs.
#[derive(Debug, Deserialize)]
pub struct SurgeRequest {
    pub query: String,
    pub city: Option<String>,
}

/// Response body for POST /surge. `agent_output` is either the structured
/// verdict or an `{error, raw}` payload; `intermediate_steps` is the ordered
/// tool-invocation trace, surfaced verbatim.
#[derive(Debug, Serialize)]
pub struct SurgeResponse {
    pub query: String,
    pub city: Option<String>,
    pub agent_output: AgentOutput,
    pub intermediate_steps: Vec<ToolInvocation>,
}

/// POST /surge - Run the surge agent for the given query.
pub async fn run_surge(
    State(state): State<SharedState>,
    Json(req): Json<SurgeRequest>,
) -> Json<SurgeResponse> {
    let request_id = Ulid::new();
    let question = match &req.city {
        Some(city) => format!("{} (city: {})", req.query, city),
        None => req.query.clone(),
    };

    tracing::info!(%request_id, question, "running surge agent");

    let run = state.agent.run(&question).await;

    if run.output.is_failed() {
        tracing::warn!(%request_id, steps = run.steps.len(), "agent run did not produce a verdict");
    } else {
        tracing::info!(%request_id, steps = run.steps.len(), "agent run complete");
    }

    Json(SurgeResponse {
        query: req.query,
        city: req.city,
        agent_output: run.output,
        intermediate_steps: run.steps,
    })
}
