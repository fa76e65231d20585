// ABOUTME: Domain types for surgesense: snapshots, readings, events, verdicts, traces.
// ABOUTME: Also provides parsing of LLM final answers into structured verdicts.

pub mod model;
pub mod verdict;

pub use model::{
    AgentOutput, AgentVerdict, CalendarEvent, EnvironmentReading, EventKind, HospitalSnapshot,
    RiskLevel, ToolInvocation,
};
pub use verdict::{VerdictParseError, extract_json, parse_verdict};
