use cortex_llm::{CompletionRequest, CompletionService, Message};
use std::sync::Arc;
use tracing::{info, warn};

/// Prompt used to distill an exchange into one stored fact
pub const SUMMARIZATION_PROMPT: &str = "Distill the following conversation into a single factual statement about the user's preferences, context, or current work. Be concise and specific.\n\nConversation:\n{conversation}\n\nFact:";

/// Summarises an exchange through the completion service
#[derive(Clone)]
pub struct MemorySummarizer {
    completion: Arc<dyn CompletionService>,
    model: String,
}

impl MemorySummarizer {
    /// Create a summariser using `model`
    pub fn new(completion: Arc<dyn CompletionService>, model: impl Into<String>) -> Self {
        Self {
            completion,
            model: model.into(),
        }
    }

    /// Model used for summaries
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Distill one user/assistant exchange; `None` when empty or on failure
    pub async fn summarize(&self, user: &str, assistant: &str) -> Option<String> {
        let conversation = format_conversation(user, assistant);
        if conversation.is_empty() {
            return None;
        }

        let prompt = SUMMARIZATION_PROMPT.replace("{conversation}", &conversation);
        let request = CompletionRequest::new(self.model.clone(), vec![Message::user(prompt)])
            .with_max_tokens(100)
            .with_temperature(0.3);

        match self.completion.complete(request).await {
            Ok(response) => {
                let summary = response.content().trim().to_string();
                if summary.is_empty() {
                    return None;
                }
                info!(
                    summary_length = summary.len(),
                    conversation_length = conversation.len(),
                    "Conversation summarized"
                );
                Some(summary)
            }
            Err(e) => {
                warn!(error = %e, model = %self.model, "Summarization failed");
                None
            }
        }
    }
}

impl std::fmt::Debug for MemorySummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySummarizer")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

fn format_conversation(user: &str, assistant: &str) -> String {
    let mut parts = Vec::with_capacity(2);
    if !user.trim().is_empty() {
        parts.push(format!("User: {user}"));
    }
    if !assistant.trim().is_empty() {
        parts.push(format!("Assistant: {assistant}"));
    }
    parts.join("\n")
}
