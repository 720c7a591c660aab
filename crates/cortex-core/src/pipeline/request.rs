//! Pipeline input and output

use crate::agentic::ExecutionTrace;
use crate::routing::{ExecutionPlan, TaskCategory};
use cortex_llm::{ChatCompletion, Message};
use serde::Serialize;

/// Model name that routes through classification and the agentic loop
pub const AUTO_MODEL: &str = "auto";

/// User id used when the caller supplies none
pub const ANONYMOUS_USER: &str = "anonymous";

/// One chat request
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRequest {
    /// Conversation
    pub messages: Vec<Message>,
    /// `auto` or a literal model
    pub model: String,
    /// Sampling temperature (bypass mode only)
    pub temperature: Option<f32>,
    /// Generation limit (bypass mode only)
    pub max_tokens: Option<u32>,
    /// End-user identifier
    pub user: String,
}

impl PipelineRequest {
    /// Routed request from the anonymous user
    #[must_use]
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: AUTO_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
            user: ANONYMOUS_USER.to_string(),
        }
    }

    /// Set the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the user
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Whether the request goes through routing
    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.model == AUTO_MODEL
    }
}

/// Result of one request
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    /// Request identifier
    pub request_id: String,
    /// Response with PII restored
    pub response: ChatCompletion,
    /// Assigned category (routed requests only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TaskCategory>,
    /// Plan that ran (routed requests only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<ExecutionPlan>,
    /// Compound sentiment score of the last user message
    pub sentiment_score: f64,
    /// Whether the sentiment breaker forced escalation
    pub sentiment_override: bool,
    /// Whether the fallback path produced the response
    pub fallback_used: bool,
    /// Steps recorded on the primary path
    pub trace: ExecutionTrace,
    /// Wall-clock latency
    pub latency_ms: u64,
}
