//! Cross-request memory
//!
//! The vector store itself is an external collaborator behind
//! [`VectorMemory`]. This module owns the context block rendering and
//! the write-back summariser.

mod local;
mod summarizer;


pub use local::LocalMemory;
pub use summarizer::{MemorySummarizer, SUMMARIZATION_PROMPT};

use crate::error::Result;
use async_trait::async_trait;
use cortex_llm::{Message, MessageRole};
use serde_json::Value;
use tracing::debug;

/// Vector memory collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorMemory: Send + Sync {
    /// Up to `top_k` summaries relevant to `query`, best first
    async fn retrieve(&self, user_id: &str, query: &str, top_k: usize) -> Result<Vec<String>>;

    /// Store a summary with free-form context
    async fn store(&self, user_id: &str, summary: &str, context: Value) -> Result<()>;
}

/// Memory that stores nothing and finds nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMemory;

#[async_trait]
impl VectorMemory for NoopMemory {
    async fn retrieve(&self, _user_id: &str, _query: &str, _top_k: usize) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn store(&self, _user_id: &str, _summary: &str, _context: Value) -> Result<()> {
        Ok(())
    }
}

/// Put `block` in front of the leading system message, inserting one if needed
pub fn prepend_system(messages: &mut Vec<Message>, block: &str) {
    match messages.first_mut() {
        Some(first) if first.role == MessageRole::System => first.prepend_text(block),
        _ => messages.insert(0, Message::system(block)),
    }
}

/// Render retrieved summaries as a context block
#[must_use]
pub fn render_context(contexts: &[String]) -> String {
    let lines: Vec<String> = contexts.iter().map(|c| format!("- {c}")).collect();
    format!(
        "[CONTEXT FROM PREVIOUS INTERACTIONS]\n{}\n[END CONTEXT]\n\n",
        lines.join("\n")
    )
}

/// Inject retrieved summaries into the system message; no-op when empty
pub fn inject_context(messages: &mut Vec<Message>, contexts: &[String]) {
    if contexts.is_empty() {
        return;
    }
    prepend_system(messages, &render_context(contexts));
    debug!(
        context_count = contexts.len(),
        total_messages = messages.len(),
        "Memory context injected"
    );
}
