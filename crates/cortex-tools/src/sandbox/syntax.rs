//! Syntax pre-checks
//!
//! Python code is parsed in-process before any subprocess starts. Other
//! interpreters get a structural check that catches the mistakes behind
//! most broken model output (unbalanced brackets, unterminated strings).

use rustpython_parser::{ast, Parse};
use serde::{Deserialize, Serialize};

/// Pre-check applied before a script is run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxCheck {
    /// Full Python parse
    #[default]
    Python,
    /// Bracket balance and string termination only
    Structural,
}

impl SyntaxCheck {
    /// Run this check against `code`
    pub fn check(self, code: &str) -> Result<(), String> {
        match self {
            Self::Python => check_syntax(code),
            Self::Structural => check_structure(code),
        }
    }
}

/// Parse `code` as a Python module
pub fn check_syntax(code: &str) -> Result<(), String> {
    ast::Suite::parse(code, "<sandbox>")
        .map(|_| ())
        .map_err(|e| e.to_string())
}

fn opening_for(close: char) -> char {
    match close {
        ')' => '(',
        ']' => '[',
        _ => '{',
    }
}

/// Scan a string literal starting at `start`; returns the index after it
fn scan_string(chars: &[char], start: usize, line: &mut usize) -> Result<usize, String> {
    let quote = chars[start];
    let start_line = *line;
    let len = chars.len();
    let triple = start + 2 < len && chars[start + 1] == quote && chars[start + 2] == quote;

    if triple {
        let mut j = start + 3;
        loop {
            if j >= len {
                return Err(format!(
                    "unterminated triple-quoted string literal (line {start_line})"
                ));
            }
            match chars[j] {
                '\\' => {
                    if chars.get(j + 1) == Some(&'\n') {
                        *line += 1;
                    }
                    j += 2;
                    continue;
                }
                '\n' => *line += 1,
                c if c == quote
                    && j + 2 < len
                    && chars[j + 1] == quote
                    && chars[j + 2] == quote =>
                {
                    return Ok(j + 3);
                }
                _ => {}
            }
            j += 1;
        }
    }

    let mut j = start + 1;
    loop {
        if j >= len || chars[j] == '\n' {
            return Err(format!("unterminated string literal (line {start_line})"));
        }
        match chars[j] {
            '\\' => {
                if chars.get(j + 1) == Some(&'\n') {
                    *line += 1;
                }
                j += 2;
                continue;
            }
            c if c == quote => return Ok(j + 1),
            _ => {}
        }
        j += 1;
    }
}

/// Check bracket balance and string termination
pub fn check_structure(code: &str) -> Result<(), String> {
    let chars: Vec<char> = code.chars().collect();
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\n' => {
                line += 1;
                i += 1;
            }
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '\'' | '"' => {
                i = scan_string(&chars, i, &mut line)?;
            }
            c @ ('(' | '[' | '{') => {
                stack.push((c, line));
                i += 1;
            }
            c @ (')' | ']' | '}') => {
                match stack.pop() {
                    Some((open, _)) if open == opening_for(c) => {}
                    Some((open, _)) => {
                        return Err(format!(
                            "closing parenthesis '{c}' does not match opening parenthesis '{open}' (line {line})"
                        ));
                    }
                    None => return Err(format!("unmatched '{c}' (line {line})")),
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    if let Some((open, open_line)) = stack.last() {
        return Err(format!("'{open}' was never closed (line {open_line})"));
    }

    Ok(())
}
