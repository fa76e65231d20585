// ABOUTME: The LanguageModel trait all reasoner adapters implement, plus an
// ABOUTME: OpenAI-compatible chat-completions adapter configured from the environment.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_MAX_TOKENS: u32 = 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while querying a language model.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {0}")]
    Provider(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("rate limited")]
    RateLimited,
}

/// The pluggable reasoner boundary. The reasoning loop treats the model as an
/// opaque text-completion capability; adapters translate a rendered prompt
/// into provider API calls.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete the prompt, halting generation at any of the stop sequences.
    async fn complete(&self, prompt: &str, stop: &[&str]) -> Result<String, LlmError>;

    /// Model identifier for logging and display.
    fn model_name(&self) -> &str;
}

/// Adapter for any OpenAI-compatible chat-completions endpoint.
pub struct OpenAiCompatModel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiCompatModel {
    /// Create an adapter reading configuration from environment variables.
    /// Required: `LLM_API_KEY`.
    /// Optional: `LLM_BASE_URL`, `LLM_MODEL`, `LLM_TEMPERATURE`, `LLM_MAX_TOKENS`.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| LlmError::Provider("LLM_API_KEY not set".to_string()))?;

        let base_url =
            std::env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let temperature = std::env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TEMPERATURE);
        let max_tokens = std::env::var("LLM_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);

        Ok(Self::new(api_key, base_url, model, temperature, max_tokens))
    }

    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
            temperature,
            max_tokens,
        }
    }

    /// Build the chat-completions request body for a single-turn prompt.
    pub fn build_request_body(&self, prompt: &str, stop: &[&str]) -> Value {
        let mut body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        });

        if !stop.is_empty() {
            body["stop"] = json!(stop);
        }

        body
    }

    /// Extract the assistant text from a chat-completions response body.
    pub fn parse_response(response_body: &Value) -> Result<String, LlmError> {
        let content = response_body
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or_else(|| {
                LlmError::InvalidResponse("missing choices[0].message.content".to_string())
            })?;

        if content.is_empty() {
            return Err(LlmError::InvalidResponse(
                "empty completion content".to_string(),
            ));
        }

        Ok(content.to_string())
    }
}

#[async_trait]
impl LanguageModel for OpenAiCompatModel {
    async fn complete(&self, prompt: &str, stop: &[&str]) -> Result<String, LlmError> {
        let body = self.build_request_body(prompt, stop);
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LlmError::Provider(
                "Unauthorized: check LLM_API_KEY".to_string(),
            ));
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(LlmError::Provider(format!(
                "API error {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse JSON: {}", e)))?;

        Self::parse_response(&response_body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
