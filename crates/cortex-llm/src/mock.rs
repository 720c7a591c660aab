//! Scripted completion service for testing
//!
//! Replies are served from a FIFO queue; an empty queue yields a default
//! reply. Models can be marked as always failing, and every request is
//! recorded for later assertions.

use crate::completion::{ChatCompletion, CompletionRequest, CompletionService, Usage};
use crate::error::{Error, Result};

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

/// One scripted outcome
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Successful completion with this content
    Content(String),
    /// Failure with this API error message
    Failure(String),
}

/// A completion service that replays scripted outcomes
#[derive(Debug, Default)]
pub struct MockCompletionService {
    replies: Mutex<VecDeque<MockReply>>,
    failing_models: Mutex<HashSet<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionService {
    /// Create an empty mock
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn push_reply(&self, content: impl Into<String>) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(MockReply::Content(content.into()));
    }

    /// Queue a failure
    pub fn push_failure(&self, message: impl Into<String>) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(MockReply::Failure(message.into()));
    }

    /// Make every request for `model` fail, regardless of the queue
    pub fn fail_model(&self, model: impl Into<String>) {
        self.failing_models
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(model.into());
    }

    /// All requests received so far
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of requests received so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Models requested, in call order
    #[must_use]
    pub fn requested_models(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| request.model)
            .collect()
    }
}

#[async_trait::async_trait]
impl CompletionService for MockCompletionService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<ChatCompletion> {
        let model = request.model.clone();
        let call_index = {
            let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
            requests.push(request);
            requests.len()
        };

        let model_fails = self
            .failing_models
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&model);
        if model_fails {
            return Err(Error::Api(format!("model {model} unavailable")));
        }

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| MockReply::Content("mock response".to_string()));

        match reply {
            MockReply::Content(content) => {
                let mut completion = ChatCompletion::from_text(
                    format!("mock-{call_index}"),
                    model,
                    content,
                    "stop",
                );
                completion.usage = Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                };
                Ok(completion)
            }
            MockReply::Failure(message) => Err(Error::Api(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[tokio::test]
    async fn test_replies_in_order_then_default() {
        let mock = MockCompletionService::new();
        mock.push_reply("first");
        mock.push_failure("boom");

        let request = CompletionRequest::new("m", vec![Message::user("hi")]);
        let first = mock.complete(request.clone()).await.unwrap();
        assert_eq!(first.content(), "first");
        assert!(mock.complete(request.clone()).await.is_err());
        let third = mock.complete(request).await.unwrap();
        assert_eq!(third.content(), "mock response");
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_failing_model_does_not_consume_queue() {
        let mock = MockCompletionService::new();
        mock.fail_model("broken");
        mock.push_reply("kept");

        let failed = mock
            .complete(CompletionRequest::new("broken", vec![]))
            .await;
        assert!(failed.is_err());

        let ok = mock
            .complete(CompletionRequest::new("fine", vec![]))
            .await
            .unwrap();
        assert_eq!(ok.content(), "kept");
        assert_eq!(mock.requested_models(), vec!["broken", "fine"]);
    }
}
