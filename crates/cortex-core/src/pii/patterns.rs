//! Detection patterns
//!
//! `regex` has no look-around, so each pattern pairs a plain regex with
//! neighbour checks. A candidate rejected by its neighbours is retried one
//! character further on, which reproduces look-around semantics for these
//! patterns.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Kind of sensitive value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PiiType {
    /// Dashed 3-2-4 social security number
    Ssn,
    /// 16-digit card number, optionally grouped
    CreditCard,
    /// Email address
    Email,
    /// Long digit run with optional `+`/`1` prefix
    Phone,
}

impl PiiType {
    /// Declaration order; patterns are applied in this order
    pub const ALL: [PiiType; 4] = [Self::Ssn, Self::CreditCard, Self::Email, Self::Phone];

    /// Name used inside tokens
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ssn => "SSN",
            Self::CreditCard => "CREDIT_CARD",
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
        }
    }

    fn regex(&self) -> &'static Regex {
        match self {
            Self::Ssn => &SSN,
            Self::CreditCard => &CREDIT_CARD,
            Self::Email => &EMAIL,
            Self::Phone => &PHONE,
        }
    }

    fn rejects_before(&self, c: char) -> bool {
        match self {
            Self::Ssn => c.is_ascii_digit() || c == '-',
            Self::CreditCard => c.is_ascii_digit(),
            Self::Email => is_email_char(c),
            Self::Phone => c.is_ascii_digit() || c == '+',
        }
    }

    fn rejects_after(&self, c: char, next: Option<char>) -> bool {
        match self {
            Self::Ssn => c.is_ascii_digit() || c == '-',
            Self::CreditCard | Self::Phone => c.is_ascii_digit(),
            // A trailing full stop ends a sentence, not the domain.
            Self::Email => {
                c.is_ascii_alphanumeric()
                    || c == '-'
                    || (c == '.' && next.is_some_and(|n| n.is_ascii_alphanumeric() || n == '-'))
            }
        }
    }
}

impl std::fmt::Display for PiiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_email_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-')
}

static SSN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{3}-\d{2}-\d{4}").expect("SSN regex is a compile-time constant")
});

static CREDIT_CARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}")
        .expect("credit card regex is a compile-time constant")
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9][a-zA-Z0-9._%+-]*@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
        .expect("email regex is a compile-time constant")
});

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?1?\d{10,14}").expect("phone regex is a compile-time constant")
});

/// Byte spans of every bounded, non-overlapping match of `kind`, left to right
#[must_use]
pub fn find_spans(kind: PiiType, text: &str) -> Vec<(usize, usize)> {
    let regex = kind.regex();
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos <= text.len() {
        let Some(found) = regex.find_at(text, pos) else {
            break;
        };
        let (start, end) = (found.start(), found.end());

        let before_ok = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !kind.rejects_before(c));
        let mut rest = text[end..].chars();
        let after_ok = match rest.next() {
            Some(c) => !kind.rejects_after(c, rest.next()),
            None => true,
        };

        if before_ok && after_ok {
            spans.push((start, end));
            pos = end;
        } else {
            pos = start + text[start..].chars().next().map_or(1, char::len_utf8);
        }
    }

    spans
}
