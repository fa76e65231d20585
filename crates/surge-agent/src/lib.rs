// ABOUTME: Agent system for surgesense: the ReAct loop, tool registry, upstream
// ABOUTME: data clients, and the pluggable language-model boundary.

use std::sync::Arc;

use surge_store::SnapshotStore;

pub mod clients;
pub mod executor;
pub mod llm;
pub mod parser;
pub mod prompt;
pub mod testing;
pub mod tools;

pub use clients::{CalendarClient, EnvironmentClient, classify_aqi};
pub use executor::{AgentRun, SurgeAgent};
pub use llm::{LanguageModel, LlmError, OpenAiCompatModel};
pub use parser::{StepDecision, StepParseError, parse_step};
pub use tools::{Tool, ToolRegistry};

/// Assemble the standard surgesense tool registry: hospital state, environment
/// (weather + AQI), and upcoming calendar events.
pub fn build_registry(
    store: SnapshotStore,
    environment: Arc<EnvironmentClient>,
    calendar: Arc<CalendarClient>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(tools::hospital_state::HospitalStateTool::new(
        store,
    )));
    registry.register(Arc::new(tools::environment::EnvironmentTool::new(
        environment,
    )));
    registry.register(Arc::new(tools::calendar::CalendarEventsTool::new(calendar)));
    registry
}
