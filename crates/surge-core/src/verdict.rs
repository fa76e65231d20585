// ABOUTME: Parses LLM final-answer text into a structured AgentVerdict.
// ABOUTME: Tolerates code fences and surrounding prose by extracting the first JSON object.

use serde_json::Value;
use thiserror::Error;

use crate::model::AgentVerdict;

/// Errors that can occur while parsing a final answer.
#[derive(Debug, Error)]
pub enum VerdictParseError {
    #[error("no JSON object found in final answer")]
    NoJson,

    #[error("final answer JSON does not match verdict schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("confidence_score {0} is out of range 0-100")]
    ConfidenceOutOfRange(u8),
}

/// Extract the first JSON value embedded in free-form model output.
/// Accepts bare JSON, ```json fenced blocks, and JSON surrounded by prose.
pub fn extract_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    if trimmed.starts_with("```") {
        let stripped = trimmed.trim_start_matches("```json");
        let stripped = stripped.trim_start_matches("```JSON");
        let stripped = stripped.trim_start_matches("```");
        if let Some(end) = stripped.rfind("```")
            && let Ok(value) = serde_json::from_str::<Value>(stripped[..end].trim())
        {
            return Some(value);
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && start < end
        && let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end])
    {
        return Some(value);
    }

    None
}

/// Parse a final answer into an AgentVerdict, validating the confidence range.
pub fn parse_verdict(text: &str) -> Result<AgentVerdict, VerdictParseError> {
    let value = extract_json(text).ok_or(VerdictParseError::NoJson)?;
    let verdict: AgentVerdict = serde_json::from_value(value)?;

    if verdict.confidence_score > 100 {
        return Err(VerdictParseError::ConfidenceOutOfRange(
            verdict.confidence_score,
        ));
    }

    Ok(verdict)
}
