//! OpenAI-compatible completion service
//!
//! Talks to any gateway exposing `POST {base_url}/chat/completions`
//! (OpenAI, Groq, OpenRouter, a local LiteLLM proxy, ...).

use crate::completion::{ChatCompletion, Choice, CompletionRequest, CompletionService, Usage};
use crate::error::{Error, Result};
use crate::message::{Message, MessageContent, MessageRole};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

// ============================================================================
// Constants
// ============================================================================

/// Default API base URL
pub const BASE_URL: &str = "https://api.openai.com/v1";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

// ============================================================================
// Security Utilities
// ============================================================================

/// Keep provider error text from leaking credentials
fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("api key")
        || lower.contains("apikey")
        || lower.contains("unauthorized")
        || lower.contains("authentication")
    {
        return "API authentication error. Please check your API key configuration.".to_string();
    }

    if lower.contains("quota") {
        return "API quota exceeded. Please try again later.".to_string();
    }

    if error.len() < 200 {
        return error.to_string();
    }

    "An API error occurred. Please try again.".to_string()
}

fn mask_api_key(key: &str) -> String {
    if key.len() <= 8 {
        return "****".to_string();
    }
    format!("{}...{}", &key[..4], &key[key.len() - 4..])
}

// ============================================================================
// Configuration
// ============================================================================

/// OpenAI-compatible service configuration
#[derive(Clone)]
pub struct OpenAiCompatConfig {
    /// API key (sent as bearer token, may be empty for local gateways)
    pub api_key: String,
    /// Base URL without the `/chat/completions` suffix
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl fmt::Debug for OpenAiCompatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCompatConfig")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiCompatConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<WireChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    #[serde(default)]
    index: u32,
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    role: Option<MessageRole>,
    content: Option<MessageContent>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: WireErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WireErrorDetail {
    message: String,
}

impl WireResponse {
    fn into_completion(self, requested_model: &str) -> Result<ChatCompletion> {
        if self.choices.is_empty() {
            return Err(Error::InvalidResponse("No choices in response".to_string()));
        }

        let choices = self
            .choices
            .into_iter()
            .map(|choice| Choice {
                index: choice.index,
                message: Message {
                    role: choice.message.role.unwrap_or(MessageRole::Assistant),
                    content: choice.message.content.unwrap_or_default(),
                },
                finish_reason: choice.finish_reason,
            })
            .collect();

        Ok(ChatCompletion {
            id: self.id,
            model: if self.model.is_empty() {
                requested_model.to_string()
            } else {
                self.model
            },
            choices,
            usage: self.usage.unwrap_or_default(),
        })
    }
}

// ============================================================================
// Service Implementation
// ============================================================================

/// OpenAI-compatible completion service
pub struct OpenAiCompatService {
    client: Client,
    config: OpenAiCompatConfig,
}

impl OpenAiCompatService {
    /// Create a new service
    pub fn new(config: OpenAiCompatConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::NotConfigured(format!("http client: {e}")))?;

        Ok(Self { client, config })
    }

    fn map_send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            let millis = u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX);
            Error::Timeout(millis)
        } else {
            Error::Network(err.to_string())
        }
    }
}

#[async_trait::async_trait]
impl CompletionService for OpenAiCompatService {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    #[instrument(skip(self, request), fields(model = %request.model, messages = request.messages.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<ChatCompletion> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        debug!("Sending completion request");

        let response = builder
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimit);
        }

        if !status.is_success() {
            let message = serde_json::from_str::<WireError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(Error::Api(sanitize_api_error(&message)));
        }

        let wire: WireResponse =
            serde_json::from_str(&text).map_err(|e| Error::InvalidResponse(e.to_string()))?;
        wire.into_completion(&request.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_debug_masks_key() {
        let config = OpenAiCompatConfig::new("sk-1234567890abcdef");
        let debug = format!("{config:?}");
        assert!(debug.contains("sk-1...cdef"));
        assert!(!debug.contains("1234567890"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = OpenAiCompatConfig::new("k").with_base_url("http://localhost:4000/v1/");
        assert_eq!(config.base_url, "http://localhost:4000/v1");
    }

    #[test]
    fn test_sanitize_api_error() {
        assert!(sanitize_api_error("Invalid API key provided").contains("authentication"));
        assert_eq!(sanitize_api_error("model not found"), "model not found");
        let long = "x".repeat(300);
        assert_eq!(
            sanitize_api_error(&long),
            "An API error occurred. Please try again."
        );
    }

    #[test]
    fn test_wire_response_conversion() {
        let wire: WireResponse = serde_json::from_value(serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "hi"},
                "finish_reason": "stop"
            }]
        }))
        .unwrap();

        let completion = wire.into_completion("llama-3.1-8b-instant").unwrap();
        assert_eq!(completion.model, "llama-3.1-8b-instant");
        assert_eq!(completion.content(), "hi");
        assert_eq!(completion.usage, Usage::default());
    }

    #[test]
    fn test_wire_response_without_choices_is_invalid() {
        let wire: WireResponse =
            serde_json::from_value(serde_json::json!({"id": "x", "choices": []})).unwrap();
        assert!(matches!(
            wire.into_completion("m"),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_null_content_becomes_empty_text() {
        let wire: WireResponse = serde_json::from_value(serde_json::json!({
            "id": "x",
            "model": "m",
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();
        let completion = wire.into_completion("m").unwrap();
        assert_eq!(completion.content(), "");
    }
}
