// ABOUTME: The Tool trait and ToolRegistry: named, schema-constrained callables
// ABOUTME: the reasoning loop invokes. Observations are always JSON envelopes.

use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

pub mod calendar;
pub mod environment;
pub mod hospital_state;

pub use calendar::CalendarEventsTool;
pub use environment::EnvironmentTool;
pub use hospital_state::HospitalStateTool;

/// A named callable the reasoning loop may invoke mid-reasoning.
///
/// Tools never return `Err`: every outcome, including upstream failure, is
/// serialized into the observation string as a `{"status": ...}` envelope so
/// the loop always has something to reason over.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Stable registered name; part of the dispatch wire contract.
    fn name(&self) -> &str;

    /// Human-readable description shown to the model, including the expected
    /// input shape.
    fn description(&self) -> &str;

    /// JSON schema for the tool's input object.
    fn parameters(&self) -> Value;

    /// Invoke the tool. The return value is the observation: a serialized
    /// `{"status":"success",...}` or `{"status":"error",...}` JSON envelope.
    async fn call(&self, input: &Value) -> String;
}

/// Serialize a success envelope.
pub fn success(data: Value) -> String {
    json!({ "status": "success", "data": data }).to_string()
}

/// Serialize an error envelope.
pub fn failure(message: impl Display) -> String {
    json!({ "status": "error", "message": message.to_string() }).to_string()
}

/// Holds the registered tools and dispatches invocations by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Comma-separated tool names for the prompt's `{tool_names}` slot.
    pub fn tool_names(&self) -> String {
        self.tools
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// One `name: description` line per tool for the prompt's `{tools}` slot.
    pub fn render_descriptions(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Invoke a tool by name. An unknown name yields an error envelope naming
    /// the valid tools, so the loop can correct itself on the next step.
    pub async fn dispatch(&self, name: &str, input: &Value) -> String {
        match self.get(name) {
            Some(tool) => tool.call(input).await,
            None => failure(format!(
                "unknown tool '{}'; valid tools are [{}]",
                name,
                self.tool_names()
            )),
        }
    }
}
