//! Deny-list for submitted code
//!
//! Matching is a case-insensitive substring test. It is best-effort
//! pattern denial, not a security boundary.

/// Constructs that are rejected before any execution
pub const DENIED_PATTERNS: &[&str] = &[
    // process control and interpreter escape
    "import os",
    "import subprocess",
    "import sys",
    "from os",
    "from subprocess",
    "exit(",
    "quit(",
    // file and network access
    "import socket",
    "import shutil",
    "import urllib",
    "import requests",
    "open(",
    "file(",
    // input
    "input(",
    "raw_input(",
    // dynamic evaluation
    "__import__",
    "exec(",
    "eval(",
    "compile(",
    "reload(",
    // introspection
    "globals(",
    "locals(",
    "vars(",
    "dir(",
    "hasattr(",
    "getattr(",
    "setattr(",
    "delattr(",
];

/// First deny-list entry found in `code`
#[must_use]
pub fn find_denied_pattern(code: &str) -> Option<&'static str> {
    let lower = code.to_lowercase();
    DENIED_PATTERNS
        .iter()
        .find(|pattern| lower.contains(*pattern))
        .copied()
}
