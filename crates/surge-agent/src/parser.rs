// ABOUTME: Parses one generated ReAct segment into either a tool invocation or a final answer.
// ABOUTME: Tolerates code fences and stray prose around the Action Input JSON.

use serde_json::Value;
use surge_core::extract_json;
use thiserror::Error;

/// What the model decided to do in a single reasoning segment.
#[derive(Debug, Clone, PartialEq)]
pub enum StepDecision {
    /// Invoke a tool with a JSON input.
    Act { tool: String, input: Value },

    /// Emit the final answer text.
    Finish { answer: String },
}

/// Errors produced by a malformed reasoning segment. These are fed back to
/// the loop as corrective observations, never surfaced to the HTTP caller.
#[derive(Debug, Error)]
pub enum StepParseError {
    #[error("segment contains neither 'Action:' nor 'Final Answer:'")]
    MissingMarkers,

    #[error("'Action:' marker present but tool name is empty")]
    MissingToolName,

    #[error("'Action:' marker present but 'Action Input:' is missing")]
    MissingActionInput,

    #[error("Action Input is not valid JSON: {0}")]
    InvalidActionInput(String),
}

/// Parse a generated segment. `Final Answer:` wins when both markers are
/// present; otherwise an `Action:` / `Action Input:` pair is required.
pub fn parse_step(text: &str) -> Result<StepDecision, StepParseError> {
    if let Some(idx) = text.find("Final Answer:") {
        let answer = text[idx + "Final Answer:".len()..].trim().to_string();
        return Ok(StepDecision::Finish { answer });
    }

    let action_idx = text.find("Action:").ok_or(StepParseError::MissingMarkers)?;
    let after_action = &text[action_idx + "Action:".len()..];

    let input_idx = after_action
        .find("Action Input:")
        .ok_or(StepParseError::MissingActionInput)?;

    let tool = after_action[..input_idx]
        .trim()
        .trim_matches(|c| c == '[' || c == ']' || c == '`')
        .trim()
        .to_string();

    if tool.is_empty() {
        return Err(StepParseError::MissingToolName);
    }

    let input_text = after_action[input_idx + "Action Input:".len()..].trim();
    let input = extract_json(input_text)
        .ok_or_else(|| StepParseError::InvalidActionInput(input_text.to_string()))?;

    Ok(StepDecision::Act { tool, input })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_action_with_json_input() {
        let text = " I should fetch the environment for Mumbai.\nAction: get_environment_tool\nAction Input: {\"city\": \"Mumbai\"}";
        let decision = parse_step(text).unwrap();
        assert_eq!(
            decision,
            StepDecision::Act {
                tool: "get_environment_tool".to_string(),
                input: json!({"city": "Mumbai"}),
            }
        );
    }

    #[test]
    fn parses_action_with_bracketed_tool_name() {
        let text = "Thought: hospital first\nAction: [get_hospital_state_tool]\nAction Input: {}";
        match parse_step(text).unwrap() {
            StepDecision::Act { tool, input } => {
                assert_eq!(tool, "get_hospital_state_tool");
                assert_eq!(input, json!({}));
            }
            other => panic!("expected Act, got {:?}", other),
        }
    }

    #[test]
    fn parses_fenced_action_input() {
        let text = "Action: get_calendar_events_tool\nAction Input: ```json\n{\"days_ahead\": 14}\n```";
        match parse_step(text).unwrap() {
            StepDecision::Act { input, .. } => assert_eq!(input["days_ahead"], 14),
            other => panic!("expected Act, got {:?}", other),
        }
    }

    #[test]
    fn parses_final_answer() {
        let text = " I now know the final answer.\nFinal Answer: {\"risk_level\": \"Low\"}";
        match parse_step(text).unwrap() {
            StepDecision::Finish { answer } => {
                assert_eq!(answer, "{\"risk_level\": \"Low\"}");
            }
            other => panic!("expected Finish, got {:?}", other),
        }
    }

    #[test]
    fn final_answer_wins_over_action() {
        let text = "Action: get_hospital_state_tool\nAction Input: {}\nFinal Answer: done";
        assert!(matches!(
            parse_step(text).unwrap(),
            StepDecision::Finish { .. }
        ));
    }

    #[test]
    fn rejects_segment_without_markers() {
        let err = parse_step("just rambling, no structure").unwrap_err();
        assert!(matches!(err, StepParseError::MissingMarkers));
    }

    #[test]
    fn rejects_action_without_input() {
        let err = parse_step("Action: get_hospital_state_tool").unwrap_err();
        assert!(matches!(err, StepParseError::MissingActionInput));
    }

    #[test]
    fn rejects_non_json_action_input() {
        let err = parse_step("Action: get_environment_tool\nAction Input: Mumbai please").unwrap_err();
        assert!(matches!(err, StepParseError::InvalidActionInput(_)));
    }

    #[test]
    fn rejects_empty_tool_name() {
        let err = parse_step("Action: \nAction Input: {}").unwrap_err();
        assert!(matches!(err, StepParseError::MissingToolName));
    }
}
