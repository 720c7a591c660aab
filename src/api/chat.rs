//! OpenAI-compatible chat completions
//!
//! `model = "auto"` (the default) routes through the orchestration
//! pipeline; any other value is forwarded to the completion service as is.

use super::error::ApiError;
use crate::middleware::auth::RequireMasterKey;
use axum::extract::rejection::JsonRejection;
use axum::extract::Extension;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use cortex_core::{PipelineRequest, RequestPipeline};
use cortex_llm::Message;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Chat completion request body
#[derive(Debug, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(default)]
    pub model: Option<String>,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub stream: bool,
}

impl ChatCompletionRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.messages.is_empty() {
            return Err(ApiError::invalid_request("messages must not be empty"));
        }
        if self.stream {
            return Err(ApiError::invalid_request("streaming is not supported"));
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ApiError::invalid_request(
                    "temperature must be between 0 and 2",
                ));
            }
        }
        if self.max_tokens == Some(0) {
            return Err(ApiError::invalid_request("max_tokens must be positive"));
        }
        Ok(())
    }

    fn into_pipeline_request(self) -> PipelineRequest {
        let mut request = PipelineRequest::new(self.messages);
        if let Some(model) = self.model.filter(|m| !m.trim().is_empty()) {
            request = request.with_model(model);
        }
        if let Some(user) = self.user.filter(|u| !u.trim().is_empty()) {
            request = request.with_user(user);
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }
}

async fn chat_completions(
    _auth: RequireMasterKey,
    Extension(pipeline): Extension<Arc<RequestPipeline>>,
    payload: Result<Json<ChatCompletionRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::invalid_request(e.body_text()))?;
    body.validate()?;
    debug!(model = ?body.model, messages = body.messages.len(), "Chat completion request");

    let output = pipeline.process(body.into_pipeline_request()).await;

    let mut headers = HeaderMap::new();
    if let Ok(value) = output.request_id.parse() {
        headers.insert("x-cortex-request-id", value);
    }
    if let Some(category) = output.category {
        headers.insert("x-cortex-task-type", HeaderValue::from_static(category.as_str()));
    }
    if output.fallback_used {
        headers.insert("x-cortex-fallback", HeaderValue::from_static("true"));
    }

    Ok((headers, Json(output.response)).into_response())
}

/// Create chat routes
pub fn chat_routes() -> Router {
    Router::new().route("/v1/chat/completions", post(chat_completions))
}
