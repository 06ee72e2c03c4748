//! Provider trait — the abstraction over chat-completion backends.
//!
//! A Provider knows how to send an ordered message list to an LLM and get a
//! single complete reply back. There is no streaming path.
//!
//! Implementations: OpenAI-compatible endpoints (DeepSeek, OpenAI,
//! OpenRouter, Ollama) and test doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;
use crate::message::ModelMessage;

/// One chat-completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "deepseek-chat")
    pub model: String,

    /// The conversation messages, system instruction first
    pub messages: Vec<ModelMessage>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

impl CompletionRequest {
    /// Build a request with the default sampling settings.
    pub fn new(model: impl Into<String>, messages: Vec<ModelMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A successful completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// Content of the first choice
    pub content: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Token usage statistics
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// The session calls `complete()` without knowing which backend is in use.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "deepseek", "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError>;

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> Result<bool, CompletionError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_request_defaults() {
        let req = CompletionRequest::new("deepseek-chat", vec![ModelMessage::user("hi")]);
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(req.max_tokens, 2000);
        assert_eq!(req.messages.len(), 1);
    }

    #[test]
    fn completion_request_overrides() {
        let req = CompletionRequest::new("m", vec![])
            .with_temperature(0.2)
            .with_max_tokens(64);
        assert!((req.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(req.max_tokens, 64);
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let req: CompletionRequest =
            serde_json::from_str(r#"{"model":"m","messages":[{"role":"user","content":"q"}]}"#)
                .unwrap();
        assert_eq!(req.max_tokens, 2000);
        assert_eq!(req.messages[0], ModelMessage::user("q"));
    }
}
