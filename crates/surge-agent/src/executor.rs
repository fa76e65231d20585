// ABOUTME: The bounded ReAct loop: render prompt, complete, parse, dispatch, observe.
// ABOUTME: Records one trace entry per tool call and absorbs every failure into the output.

use std::sync::Arc;

use surge_core::{AgentOutput, ToolInvocation, parse_verdict};

use crate::llm::LanguageModel;
use crate::parser::{StepDecision, parse_step};
use crate::prompt::render_prompt;
use crate::tools::ToolRegistry;

const DEFAULT_MAX_STEPS: usize = 30;

/// Observation fed back when a reasoning segment could not be parsed, so the
/// model can correct its format on the next step.
const FORMAT_CORRECTION: &str = "Invalid format. Either provide 'Action:' with a tool name and \
     'Action Input:' with a JSON object, or provide 'Final Answer:' with the final JSON.";

/// Lifecycle of a single request through the reasoning loop. Terminal phases
/// are `Responded` and `Failed`; either way the HTTP caller gets a 200 with
/// the outcome in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestPhase {
    Received,
    Reasoning,
    ToolCall,
    Observed,
    Finalizing,
    Responded,
    Failed,
}

/// The outcome of one reasoning run: the final output plus the ordered trace
/// of tool invocations, surfaced verbatim to the caller.
#[derive(Debug, Clone)]
pub struct AgentRun {
    pub output: AgentOutput,
    pub steps: Vec<ToolInvocation>,
}

/// Drives the ReAct loop over a pluggable language model and the tool
/// registry. Strictly sequential: each observation is appended to the
/// scratchpad before the next reasoning step begins.
pub struct SurgeAgent {
    model: Arc<dyn LanguageModel>,
    registry: ToolRegistry,
    max_steps: usize,
}

impl SurgeAgent {
    pub fn new(model: Arc<dyn LanguageModel>, registry: ToolRegistry) -> Self {
        Self {
            model,
            registry,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Run the loop to completion for one question.
    pub async fn run(&self, question: &str) -> AgentRun {
        let mut phase = RequestPhase::Received;
        let tools_block = self.registry.render_descriptions();
        let tool_names = self.registry.tool_names();

        let mut scratchpad = String::new();
        let mut steps: Vec<ToolInvocation> = Vec::new();

        for step_index in 0..self.max_steps {
            transition(&mut phase, RequestPhase::Reasoning);

            let rendered = render_prompt(question, &tools_block, &tool_names, &scratchpad);
            let text = match self.model.complete(&rendered, &["\nObservation:"]).await {
                Ok(text) => text,
                Err(e) => {
                    transition(&mut phase, RequestPhase::Failed);
                    tracing::warn!(step_index, error = %e, "language model call failed");
                    return AgentRun {
                        output: AgentOutput::Failed {
                            error: format!("language model error: {}", e),
                            raw: scratchpad,
                        },
                        steps,
                    };
                }
            };

            match parse_step(&text) {
                Ok(StepDecision::Finish { answer }) => {
                    transition(&mut phase, RequestPhase::Finalizing);
                    let output = match parse_verdict(&answer) {
                        Ok(verdict) => {
                            transition(&mut phase, RequestPhase::Responded);
                            AgentOutput::Verdict(verdict)
                        }
                        Err(e) => {
                            transition(&mut phase, RequestPhase::Failed);
                            tracing::warn!(error = %e, "final answer is not a valid verdict");
                            AgentOutput::Failed {
                                error: "Unable to parse JSON".to_string(),
                                raw: answer,
                            }
                        }
                    };
                    return AgentRun { output, steps };
                }

                Ok(StepDecision::Act { tool, input }) => {
                    transition(&mut phase, RequestPhase::ToolCall);
                    tracing::debug!(step_index, tool, "dispatching tool");

                    let observation = self.registry.dispatch(&tool, &input).await;
                    transition(&mut phase, RequestPhase::Observed);

                    steps.push(ToolInvocation {
                        tool,
                        tool_input: input,
                        observation: observation.clone(),
                        log: normalize_log(&text),
                    });

                    extend_scratchpad(&mut scratchpad, &text, &observation);
                }

                Err(e) => {
                    tracing::warn!(step_index, error = %e, "unparseable reasoning segment, feeding correction back");
                    extend_scratchpad(&mut scratchpad, &text, FORMAT_CORRECTION);
                }
            }
        }

        transition(&mut phase, RequestPhase::Failed);
        AgentRun {
            output: AgentOutput::Failed {
                error: format!(
                    "agent stopped after {} steps without a final answer",
                    self.max_steps
                ),
                raw: scratchpad,
            },
            steps,
        }
    }
}

fn transition(phase: &mut RequestPhase, next: RequestPhase) {
    tracing::trace!(from = ?phase, to = ?next, "request phase transition");
    *phase = next;
}

/// The prompt ends with a bare `Thought:` marker, so models usually do not
/// repeat it. The recorded log must self-contain the `Thought:`..`Action:`
/// span the dashboard parses, so prefix the marker when it is absent.
fn normalize_log(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.contains("Thought:") {
        trimmed.to_string()
    } else {
        format!("Thought: {}", trimmed)
    }
}

fn extend_scratchpad(scratchpad: &mut String, generated: &str, observation: &str) {
    scratchpad.push_str(generated.trim_end());
    scratchpad.push_str("\nObservation: ");
    scratchpad.push_str(observation);
    scratchpad.push_str("\nThought:");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{CalendarClient, EnvironmentClient};
    use crate::testing::{FailingModel, ScriptedModel};
    use chrono::Utc;
    use serde_json::Value;
    use std::collections::BTreeMap;
    use surge_core::{HospitalSnapshot, RiskLevel};
    use surge_store::SnapshotStore;
    use tempfile::TempDir;

    const FINAL_HIGH: &str = r#" I now know the final answer.
Final Answer: {
  "risk_level": "High",
  "confidence_score": 82,
  "drivers": ["AQI above 300", "bed occupancy at 95%"],
  "predicted_impacts": ["Respiratory", "Emergency"],
  "operational_actions": ["Add respiratory triage lane"],
  "supply_actions": ["Restock N95 masks"],
  "patient_advisory": "Air quality is hazardous. Limit outdoor activity and wear a mask.",
  "summary": "High surge risk from hazardous air and near-full beds."
}"#;

    fn high_occupancy_snapshot() -> HospitalSnapshot {
        let mut opd = BTreeMap::new();
        opd.insert("respiratory".to_string(), 48);
        opd.insert("emergency".to_string(), 35);
        HospitalSnapshot {
            timestamp: Utc::now(),
            bed_occupancy_pct: 95.0,
            opd_visits_by_department: opd,
            icu_occupancy_pct: 92.0,
            ppe_stock_pct: 40.0,
            blood_bank_units: 70,
            vaccine_stock_pct: 35.0,
        }
    }

    fn registry_with_store(dir: &TempDir) -> (ToolRegistry, SnapshotStore) {
        let store = SnapshotStore::new(dir.path().join("hospital.json"));
        let environment = Arc::new(EnvironmentClient::new(None).with_upstreams(
            "http://127.0.0.1:1/geocode".to_string(),
            "http://127.0.0.1:1/forecast".to_string(),
            "http://127.0.0.1:1/air-quality".to_string(),
            "http://127.0.0.1:1".to_string(),
        ));
        let calendar = Arc::new(CalendarClient::new(None, "IN"));
        let registry = crate::build_registry(store.clone(), environment, calendar);
        (registry, store)
    }

    fn agent(model: impl LanguageModel + 'static, registry: ToolRegistry) -> SurgeAgent {
        SurgeAgent::new(Arc::new(model), registry)
    }

    #[tokio::test]
    async fn tool_call_then_final_answer_produces_verdict_and_trace() {
        let dir = TempDir::new().unwrap();
        let (registry, store) = registry_with_store(&dir);
        store.append(&high_occupancy_snapshot()).unwrap();

        let model = ScriptedModel::new([
            " I should check the hospital state first.\nAction: get_hospital_state_tool\nAction Input: {}",
            FINAL_HIGH,
        ]);

        let run = agent(model, registry).run("Assess surge risk for Mumbai").await;

        match &run.output {
            AgentOutput::Verdict(verdict) => {
                assert!(matches!(
                    verdict.risk_level,
                    RiskLevel::High | RiskLevel::Critical
                ));
                assert_eq!(verdict.confidence_score, 82);
            }
            other => panic!("expected verdict, got {:?}", other),
        }

        assert_eq!(run.steps.len(), 1);
        let step = &run.steps[0];
        assert_eq!(step.tool, "get_hospital_state_tool");
        assert!(step.log.contains("Thought:"));
        assert!(step.log.contains("Action:"));
        assert_eq!(
            step.thought(),
            Some("I should check the hospital state first.")
        );
        assert!(step.observation.contains("\"bed_occupancy_pct\":95.0"));
    }

    #[tokio::test]
    async fn unparseable_final_answer_yields_error_payload_not_http_failure() {
        let dir = TempDir::new().unwrap();
        let (registry, _store) = registry_with_store(&dir);

        let model = ScriptedModel::new([" All done.\nFinal Answer: the risk seems high to me"]);
        let run = agent(model, registry).run("Assess risk").await;

        match run.output {
            AgentOutput::Failed { error, raw } => {
                assert_eq!(error, "Unable to parse JSON");
                assert!(raw.contains("the risk seems high"));
            }
            other => panic!("expected failure payload, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn step_budget_exhaustion_fails_with_trace_preserved() {
        let dir = TempDir::new().unwrap();
        let (registry, _store) = registry_with_store(&dir);

        let loop_forever =
            " Checking again.\nAction: get_hospital_state_tool\nAction Input: {}";
        let model = ScriptedModel::new([loop_forever, loop_forever, loop_forever]);

        let run = agent(model, registry)
            .with_max_steps(2)
            .run("Assess risk")
            .await;

        match &run.output {
            AgentOutput::Failed { error, .. } => {
                assert!(error.contains("2 steps"));
            }
            other => panic!("expected failure payload, got {:?}", other),
        }
        assert_eq!(run.steps.len(), 2);
    }

    #[tokio::test]
    async fn malformed_segment_gets_corrective_feedback_and_no_trace_entry() {
        let dir = TempDir::new().unwrap();
        let (registry, _store) = registry_with_store(&dir);

        let model = ScriptedModel::new(["I forgot the format entirely", FINAL_HIGH]);
        let run = agent(model, registry).run("Assess risk").await;

        assert!(matches!(run.output, AgentOutput::Verdict(_)));
        assert!(run.steps.is_empty());
    }

    #[tokio::test]
    async fn model_failure_is_absorbed_into_output() {
        let dir = TempDir::new().unwrap();
        let (registry, _store) = registry_with_store(&dir);

        let run = agent(FailingModel, registry).run("Assess risk").await;

        match run.output {
            AgentOutput::Failed { error, .. } => {
                assert!(error.contains("language model error"));
            }
            other => panic!("expected failure payload, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unknown_tool_becomes_observation_and_loop_continues() {
        let dir = TempDir::new().unwrap();
        let (registry, _store) = registry_with_store(&dir);

        let model = ScriptedModel::new([
            " Trying something odd.\nAction: make_coffee\nAction Input: {}",
            FINAL_HIGH,
        ]);
        let run = agent(model, registry).run("Assess risk").await;

        assert!(matches!(run.output, AgentOutput::Verdict(_)));
        assert_eq!(run.steps.len(), 1);
        assert_eq!(run.steps[0].tool, "make_coffee");
        assert!(run.steps[0].observation.contains("unknown tool"));
    }

    #[tokio::test]
    async fn every_tool_failing_still_completes_the_run() {
        // Empty store, unreachable environment, keyless calendar: all three
        // tools degrade, and the run still reaches a final output.
        let dir = TempDir::new().unwrap();
        let (registry, _store) = registry_with_store(&dir);

        let model = ScriptedModel::new([
            " Hospital first.\nAction: get_hospital_state_tool\nAction Input: {}",
            " Environment next.\nAction: get_environment_tool\nAction Input: {\"city\": \"Mumbai\"}",
            " Calendar last.\nAction: get_calendar_events_tool\nAction Input: {\"days_ahead\": 5}",
            FINAL_HIGH,
        ]);

        let run = agent(model, registry).run("Assess risk for Mumbai").await;

        assert!(matches!(run.output, AgentOutput::Verdict(_)));
        assert_eq!(run.steps.len(), 3);
        for step in &run.steps {
            let parsed: Value = serde_json::from_str(&step.observation).unwrap();
            assert!(parsed.get("status").is_some());
            assert!(step.log.contains("Thought:"));
        }
    }
}
