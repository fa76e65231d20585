// ABOUTME: Core data model: hospital snapshots, environment readings, calendar events,
// ABOUTME: agent verdicts, and the tool-invocation trace entry surfaced to clients.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single synthetic hospital state record. Snapshots form an append-only
/// sequence in the store; each one is self-contained and only the most recent
/// is consumed by tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalSnapshot {
    pub timestamp: DateTime<Utc>,
    pub bed_occupancy_pct: f64,
    pub opd_visits_by_department: BTreeMap<String, u32>,
    pub icu_occupancy_pct: f64,
    pub ppe_stock_pct: f64,
    pub blood_bank_units: u32,
    pub vaccine_stock_pct: f64,
}

impl HospitalSnapshot {
    /// Total OPD visits across all departments.
    pub fn opd_visits_total(&self) -> u32 {
        self.opd_visits_by_department.values().sum()
    }
}

/// Weather and air-quality conditions for a city, fetched per request and
/// never persisted. Measurement fields are optional so a degraded reading can
/// mark them absent instead of failing the tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentReading {
    pub city: String,
    pub temperature_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub aqi: Option<u32>,
    pub timestamp: DateTime<Utc>,
}

impl EnvironmentReading {
    /// An empty reading for a city whose upstreams could not be reached.
    pub fn unavailable(city: &str) -> Self {
        Self {
            city: city.to_string(),
            temperature_c: None,
            precipitation_mm: None,
            aqi: None,
            timestamp: Utc::now(),
        }
    }
}

/// Whether a calendar entry is a public holiday or a festival/observance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Holiday,
    Festival,
}

/// An upcoming public holiday or festival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub name: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: EventKind,
}

/// Surge risk severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

/// The structured verdict the reasoning loop must emit as its final answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentVerdict {
    pub risk_level: RiskLevel,
    pub confidence_score: u8,
    pub drivers: Vec<String>,
    pub predicted_impacts: Vec<String>,
    pub operational_actions: Vec<String>,
    pub supply_actions: Vec<String>,
    pub patient_advisory: String,
    pub summary: String,
}

/// What the `/surge` endpoint reports as `agent_output`: either a parsed
/// verdict, or an error payload carrying the raw model text when the final
/// answer could not be parsed (or the loop itself failed). Serialized
/// untagged so clients see either the verdict object or `{error, raw}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentOutput {
    Verdict(AgentVerdict),
    Failed { error: String, raw: String },
}

impl AgentOutput {
    pub fn is_failed(&self) -> bool {
        matches!(self, AgentOutput::Failed { .. })
    }
}

/// One tool call performed by the reasoning loop, surfaced verbatim in
/// `intermediate_steps`. The `log` field carries the raw reasoning segment
/// that preceded the call; the dashboard extracts the substring between the
/// `Thought:` and `Action:` markers, so both markers must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool: String,
    pub tool_input: Value,
    pub observation: String,
    pub log: String,
}

impl ToolInvocation {
    /// The free-text reasoning span between the `Thought:` and `Action:`
    /// markers, or None if either marker is missing.
    pub fn thought(&self) -> Option<&str> {
        let start = self.log.find("Thought:")? + "Thought:".len();
        let rest = &self.log[start..];
        let end = rest.find("Action:")?;
        Some(rest[..end].trim())
    }
}
