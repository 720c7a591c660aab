//! PII redaction engine
//!
//! Replaces sensitive substrings with `[PII_<TYPE>_<8 hex>]` tokens before
//! anything leaves the process, and swaps them back on the way out.
//!
//! Patterns run in declaration order (SSN, card, email, phone); each
//! pattern scans the text already rewritten by the previous ones. Within a
//! pattern, matches never overlap and the leftmost wins.

mod patterns;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

pub use patterns::{find_spans, PiiType};

/// How repeated occurrences of the same value are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionMode {
    /// Only the first occurrence of each distinct value is tokenized;
    /// later identical occurrences stay as they are
    #[default]
    FirstOccurrence,
    /// Every occurrence is tokenized (same value, same token)
    AllOccurrences,
}

/// One token and the value it stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiEntry {
    /// Placeholder inserted into the text
    pub token: String,
    /// Detected kind
    pub pii_type: PiiType,
    /// Original value
    pub original: String,
}

/// Ordered token → value mapping for one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiMapping {
    entries: Vec<PiiEntry>,
}

impl PiiMapping {
    /// Whether nothing was redacted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of tokens
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in creation order
    #[must_use]
    pub fn entries(&self) -> &[PiiEntry] {
        &self.entries
    }

    /// Original value behind `token`
    #[must_use]
    pub fn original(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.token == token)
            .map(|entry| entry.original.as_str())
    }

    /// Distinct kinds present, in first-seen order
    #[must_use]
    pub fn types(&self) -> Vec<PiiType> {
        let mut types = Vec::new();
        for entry in &self.entries {
            if !types.contains(&entry.pii_type) {
                types.push(entry.pii_type);
            }
        }
        types
    }

    fn token_for(&self, pii_type: PiiType, original: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.pii_type == pii_type && entry.original == original)
            .map(|entry| entry.token.as_str())
    }

    fn contains_token(&self, token: &str) -> bool {
        self.entries.iter().any(|entry| entry.token == token)
    }
}

/// Redaction engine
#[derive(Debug, Clone, Copy, Default)]
pub struct PiiRedactor {
    mode: RedactionMode,
}

impl PiiRedactor {
    /// Create a redactor
    #[must_use]
    pub fn new(mode: RedactionMode) -> Self {
        Self { mode }
    }

    /// Configured mode
    #[must_use]
    pub fn mode(&self) -> RedactionMode {
        self.mode
    }

    /// Redact `text`, returning the rewritten text and a fresh mapping
    #[must_use]
    pub fn redact(&self, text: &str) -> (String, PiiMapping) {
        let mut mapping = PiiMapping::default();
        let redacted = self.redact_into(text, &mut mapping);
        (redacted, mapping)
    }

    /// Redact `text`, adding new tokens to an existing mapping
    ///
    /// A value already present in `mapping` reuses its token, so a value
    /// seen in several messages of one request maps to a single token.
    pub fn redact_into(&self, text: &str, mapping: &mut PiiMapping) -> String {
        let mut current = text.to_string();

        for pii_type in PiiType::ALL {
            let spans = find_spans(pii_type, &current);
            if spans.is_empty() {
                continue;
            }

            let mut seen: Vec<&str> = Vec::new();
            let mut chosen: Vec<(usize, usize, String)> = Vec::new();
            for (start, end) in spans {
                let value = &current[start..end];
                let repeat = seen.contains(&value);
                if repeat && self.mode == RedactionMode::FirstOccurrence {
                    continue;
                }
                if !repeat {
                    seen.push(value);
                }

                let existing = mapping.token_for(pii_type, value).map(str::to_string);
                let token = match existing {
                    Some(token) => token,
                    None => {
                        let token = new_token(pii_type, &current, mapping);
                        mapping.entries.push(PiiEntry {
                            token: token.clone(),
                            pii_type,
                            original: value.to_string(),
                        });
                        token
                    }
                };
                chosen.push((start, end, token));
            }

            debug!(pii_type = %pii_type, count = chosen.len(), "PII detected");

            let mut rebuilt = String::with_capacity(current.len());
            let mut cursor = 0;
            for (start, end, token) in &chosen {
                rebuilt.push_str(&current[cursor..*start]);
                rebuilt.push_str(token);
                cursor = *end;
            }
            rebuilt.push_str(&current[cursor..]);
            current = rebuilt;
        }

        current
    }
}

/// Replace every token of `mapping` found in `text` with its original value
#[must_use]
pub fn restore(text: &str, mapping: &PiiMapping) -> String {
    let mut restored = text.to_string();
    for entry in &mapping.entries {
        if restored.contains(&entry.token) {
            restored = restored.replace(&entry.token, &entry.original);
        }
    }
    restored
}

fn new_token(pii_type: PiiType, text: &str, mapping: &PiiMapping) -> String {
    loop {
        let hex = Uuid::new_v4().simple().to_string();
        let token = format!("[PII_{}_{}]", pii_type.as_str(), &hex[..8]);
        if !text.contains(&token) && !mapping.contains_token(&token) {
            return token;
        }
    }
}
