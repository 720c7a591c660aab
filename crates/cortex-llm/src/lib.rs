//! Cortex LLM - Completion Service Boundary
//!
//! This crate provides the completion-service side of Cortex:
//! - Message: OpenAI-shaped chat messages (text and multimodal parts)
//! - Completion: request/response types and the `CompletionService` trait
//! - OpenAI-compatible: reqwest client for any `/chat/completions` gateway
//! - Mock: scripted service for tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod message;
pub mod mock;
pub mod openai_compat;

pub use completion::{ChatCompletion, Choice, CompletionRequest, CompletionService, Usage};
pub use error::{Error, Result};
pub use message::{
    contains_image, last_user_index, last_user_text, ContentPart, ImageUrl, Message,
    MessageContent, MessageRole,
};
pub use mock::{MockCompletionService, MockReply};
pub use openai_compat::{OpenAiCompatConfig, OpenAiCompatService};
