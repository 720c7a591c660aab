//! Code sandbox
//!
//! Runs model-generated code in a short-lived subprocess:
//! 1. empty input is rejected
//! 2. the deny-list is checked (before anything else looks at the code)
//! 3. the syntax pre-check runs (a Python parse by default)
//! 4. the script executes with a hard timeout and an output cap

mod runner;
pub mod security;
pub mod syntax;

#[cfg(test)]
mod tests;

use crate::error::Error;
use crate::outcome::{ToolFailureKind, ToolOutcome};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub use security::{find_denied_pattern, DENIED_PATTERNS};
pub use syntax::{check_structure, check_syntax, SyntaxCheck};

/// Marker appended to output that hit the cap
pub const TRUNCATION_MARKER: &str = "\n... (output truncated)";

/// Default execution timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default output cap in characters
pub const DEFAULT_MAX_OUTPUT_CHARS: usize = 10_000;

/// Sandbox configuration
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Interpreter binary
    pub interpreter: String,
    /// Arguments placed before the script path
    pub interpreter_args: Vec<String>,
    /// Suffix of the temporary script file
    pub script_suffix: String,
    /// Pre-check run before spawning
    pub syntax_check: SyntaxCheck,
    /// Hard wall-clock limit
    pub timeout: Duration,
    /// Output cap in characters (applied to stdout and stderr separately)
    pub max_output_chars: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            interpreter_args: vec!["-I".to_string()],
            script_suffix: ".py".to_string(),
            syntax_check: SyntaxCheck::Python,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_output_chars: DEFAULT_MAX_OUTPUT_CHARS,
        }
    }
}

impl SandboxConfig {
    /// Use a different interpreter (clears interpreter arguments)
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self.interpreter_args.clear();
        self
    }

    /// Set interpreter arguments
    #[must_use]
    pub fn with_interpreter_args(mut self, args: Vec<String>) -> Self {
        self.interpreter_args = args;
        self
    }

    /// Set the script file suffix
    #[must_use]
    pub fn with_script_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.script_suffix = suffix.into();
        self
    }

    /// Set the syntax pre-check
    #[must_use]
    pub fn with_syntax_check(mut self, check: SyntaxCheck) -> Self {
        self.syntax_check = check;
        self
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the output cap
    #[must_use]
    pub fn with_max_output_chars(mut self, max: usize) -> Self {
        self.max_output_chars = max;
        self
    }
}

/// Cut `text` to `max_chars` characters, appending the truncation marker
#[must_use]
pub fn truncate_output(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}{TRUNCATION_MARKER}", &text[..byte_index]),
        None => text.to_string(),
    }
}

/// Cap a stream that may already have been cut short while reading
fn cap_output(text: &str, max_chars: usize, overflow: bool) -> String {
    let capped = truncate_output(text, max_chars);
    if overflow && !capped.ends_with(TRUNCATION_MARKER) {
        format!("{capped}{TRUNCATION_MARKER}")
    } else {
        capped
    }
}

/// Subprocess code sandbox
#[derive(Debug, Clone, Default)]
pub struct CodeSandbox {
    config: SandboxConfig,
}

impl CodeSandbox {
    /// Create a sandbox
    #[must_use]
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }

    /// Sandbox configuration
    #[must_use]
    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Validate and run `code`
    pub async fn execute(&self, code: &str) -> ToolOutcome {
        let started = Instant::now();
        let outcome = self.execute_inner(code).await;
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        outcome.with_duration_ms(elapsed)
    }

    async fn execute_inner(&self, code: &str) -> ToolOutcome {
        if code.trim().is_empty() {
            return ToolOutcome::failure(ToolFailureKind::InvalidInput, "No code provided");
        }

        if let Some(pattern) = find_denied_pattern(code) {
            warn!(pattern = %pattern, "Code rejected by deny-list");
            return ToolOutcome::failure(
                ToolFailureKind::Denied,
                format!("Code contains forbidden pattern: {pattern}"),
            );
        }

        if let Err(message) = self.config.syntax_check.check(code) {
            debug!(error = %message, "Code failed syntax pre-check");
            return ToolOutcome::failure(ToolFailureKind::Syntax, format!("Syntax error: {message}"));
        }

        match runner::run_script(&self.config, code).await {
            Ok(output) => {
                let max = self.config.max_output_chars;
                let stdout = cap_output(&output.stdout, max, output.stdout_overflow);
                if output.success {
                    ToolOutcome::success(stdout).with_exit_code(output.exit_code)
                } else {
                    let stderr =
                        cap_output(output.stderr.trim_end(), max, output.stderr_overflow);
                    let error = if stderr.is_empty() {
                        format!("Process exited with code {}", output.exit_code)
                    } else {
                        stderr
                    };
                    ToolOutcome::failure(ToolFailureKind::Runtime, error)
                        .with_output(stdout)
                        .with_exit_code(output.exit_code)
                }
            }
            Err(Error::Timeout(_)) => {
                warn!(
                    timeout_secs = self.config.timeout.as_secs(),
                    "Code execution timed out"
                );
                ToolOutcome::failure(
                    ToolFailureKind::Timeout,
                    format!(
                        "Code execution timed out after {} seconds",
                        self.config.timeout.as_secs()
                    ),
                )
            }
            Err(e) => ToolOutcome::failure(ToolFailureKind::Runtime, e.to_string()),
        }
    }
}
