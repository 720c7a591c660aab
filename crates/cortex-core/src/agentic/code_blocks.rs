//! Fenced code extraction

use regex::Regex;
use std::sync::LazyLock;

static FENCED_PYTHON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:python|py)?\n(.*?)```")
        .expect("fenced code pattern is a compile-time constant")
});

/// Whether the text has any code fence
#[must_use]
pub fn contains_code(content: &str) -> bool {
    content.contains("```")
}

/// Bodies of untagged or Python-tagged fenced blocks, trimmed, in order
#[must_use]
pub fn extract_code_blocks(content: &str) -> Vec<String> {
    FENCED_PYTHON
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}
