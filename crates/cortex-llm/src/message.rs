//! Chat message types
//!
//! Messages follow the OpenAI wire shape: `content` is either a plain
//! string or a list of typed parts (text and image references).

use serde::{Deserialize, Serialize};

/// Role of a message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions
    System,
    /// End user
    User,
    /// Model output
    Assistant,
}

impl MessageRole {
    /// Wire name of the role
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Image reference inside a multimodal message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// URL or data URI of the image
    pub url: String,
    /// Optional detail hint (`low`, `high`, `auto`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// One part of a structured message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text part
    Text {
        /// The text
        text: String,
    },
    /// Image reference part
    ImageUrl {
        /// The image reference
        image_url: ImageUrl,
    },
}

/// Message content: plain text or structured parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text content
    Text(String),
    /// Structured multimodal content
    Parts(Vec<ContentPart>),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// A chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author role
    pub role: MessageRole,
    /// Message content
    #[serde(default)]
    pub content: MessageContent,
}

impl Message {
    /// Create a text message with the given role
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Create a user message with structured parts
    #[must_use]
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Parts(parts),
        }
    }

    /// Textual content; text parts of structured content are joined with a space
    #[must_use]
    pub fn text(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Whether the message carries an image reference
    #[must_use]
    pub fn has_image(&self) -> bool {
        match &self.content {
            MessageContent::Text(_) => false,
            MessageContent::Parts(parts) => parts
                .iter()
                .any(|part| matches!(part, ContentPart::ImageUrl { .. })),
        }
    }

    /// Rewrite every piece of text in place, leaving image parts untouched
    pub fn map_text<F>(&mut self, mut f: F)
    where
        F: FnMut(&str) -> String,
    {
        match &mut self.content {
            MessageContent::Text(text) => *text = f(text),
            MessageContent::Parts(parts) => {
                for part in parts.iter_mut() {
                    if let ContentPart::Text { text } = part {
                        *text = f(text);
                    }
                }
            }
        }
    }

    /// Put `prefix` in front of the message text
    pub fn prepend_text(&mut self, prefix: &str) {
        match &mut self.content {
            MessageContent::Text(text) => text.insert_str(0, prefix),
            MessageContent::Parts(parts) => parts.insert(
                0,
                ContentPart::Text {
                    text: prefix.to_string(),
                },
            ),
        }
    }
}

/// Index of the last user-role message
#[must_use]
pub fn last_user_index(messages: &[Message]) -> Option<usize> {
    messages.iter().rposition(|m| m.role == MessageRole::User)
}

/// Text of the last user-role message, or an empty string
#[must_use]
pub fn last_user_text(messages: &[Message]) -> String {
    last_user_index(messages)
        .map(|i| messages[i].text())
        .unwrap_or_default()
}

/// Whether any message in the conversation carries an image
#[must_use]
pub fn contains_image(messages: &[Message]) -> bool {
    messages.iter().any(Message::has_image)
}
