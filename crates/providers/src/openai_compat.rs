//! OpenAI-compatible provider implementation.
//!
//! Works with: DeepSeek, OpenAI, OpenRouter, Ollama, vLLM, and any endpoint
//! exposing `POST {base_url}/chat/completions`.
//!
//! One request in, one complete reply out. No streaming, no tools.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sourcechat_config::{HttpConfig, ProviderConfig};
use sourcechat_core::error::CompletionError;
use sourcechat_core::message::ModelMessage;
use sourcechat_core::provider::{Completion, CompletionRequest, Usage};
use tracing::{debug, warn};

/// An OpenAI-compatible chat-completion provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CompletionError::Api {
                status: None,
                detail: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Create a DeepSeek provider (convenience constructor).
    pub fn deepseek(api_key: impl Into<String>) -> Result<Self, CompletionError> {
        Self::new(
            "deepseek",
            "https://api.deepseek.com",
            api_key,
            Duration::from_secs(120),
        )
    }

    /// Build a provider from the `[provider]` and `[http]` config sections.
    pub fn from_config(
        provider: &ProviderConfig,
        http: &HttpConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, CompletionError> {
        Self::new(
            provider.name.clone(),
            provider.base_url.clone(),
            api_key,
            Duration::from_secs(http.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Convert our messages to OpenAI API format.
    fn to_api_messages(messages: &[ModelMessage]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.as_str().into(),
                content: Some(m.content.clone()),
            })
            .collect()
    }
}

/// Classify a transport-level failure.
fn classify_send_error(e: reqwest::Error) -> CompletionError {
    if e.is_connect() || e.is_timeout() {
        CompletionError::Connection(e.to_string())
    } else {
        CompletionError::Api {
            status: e.status().map(|s| s.as_u16()),
            detail: e.to_string(),
        }
    }
}

/// Pull the most useful detail out of an error body.
///
/// JSON bodies yield `error.message` when present, otherwise the whole
/// document; anything else is passed through as text.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => json["error"]["message"]
            .as_str()
            .map(String::from)
            .unwrap_or_else(|| serde_json::to_string_pretty(&json).unwrap_or_default()),
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl sourcechat_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "stream": false,
        });

        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status().as_u16();

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(CompletionError::Api {
                status: Some(status),
                detail: error_detail(&error_body),
            });
        }

        let raw = response.text().await.map_err(classify_send_error)?;
        let raw = raw.trim();
        if raw.is_empty() || raw == "null" {
            warn!(status, "Provider returned an empty body");
            return Err(CompletionError::Empty);
        }

        let api_response: ApiResponse =
            serde_json::from_str(raw).map_err(|e| CompletionError::Api {
                status: Some(status),
                detail: format!("Failed to parse response: {e}"),
            })?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(CompletionError::Empty)?;

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        debug!(
            provider = %self.name,
            chars = content.len(),
            total_tokens = ?usage.map(|u| u.total_tokens),
            "Completion received"
        );

        Ok(Completion {
            content,
            model: api_response.model.unwrap_or(request.model),
            usage,
        })
    }

    async fn health_check(&self) -> Result<bool, CompletionError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(classify_send_error)?;

        Ok(response.status().is_success())
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
