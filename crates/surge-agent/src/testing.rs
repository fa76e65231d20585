// ABOUTME: Test utilities for surge-agent: scripted and failing language models.
// ABOUTME: Used to drive the reasoning loop deterministically without real API calls.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{LanguageModel, LlmError};

/// A language model that replays a fixed sequence of responses, one per
/// `complete` call. Exhausting the script yields a provider error, which the
/// loop absorbs into a failed agent output.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedModel {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, _prompt: &str, _stop: &[&str]) -> Result<String, LlmError> {
        let mut responses = self
            .responses
            .lock()
            .map_err(|_| LlmError::Provider("script mutex poisoned".to_string()))?;
        responses
            .pop_front()
            .ok_or_else(|| LlmError::Provider("scripted responses exhausted".to_string()))
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// A language model whose every call fails, for exercising the loop's
/// failure-absorption path.
pub struct FailingModel;

#[async_trait]
impl LanguageModel for FailingModel {
    async fn complete(&self, _prompt: &str, _stop: &[&str]) -> Result<String, LlmError> {
        Err(LlmError::Provider("model unavailable".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_model_replays_in_order_then_errors() {
        let model = ScriptedModel::new(["first", "second"]);

        assert_eq!(model.complete("p", &[]).await.unwrap(), "first");
        assert_eq!(model.complete("p", &[]).await.unwrap(), "second");
        assert!(model.complete("p", &[]).await.is_err());
    }

    #[tokio::test]
    async fn failing_model_always_errors() {
        let err = FailingModel.complete("p", &[]).await.unwrap_err();
        assert!(err.to_string().contains("model unavailable"));
    }
}
