//! Structured tool results
//!
//! Tools never raise into the agentic loop. Denials, syntax errors and
//! timeouts come back as failed outcomes so they can be fed to the worker
//! as corrective context.

use serde::{Deserialize, Serialize};

/// Why a tool call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolFailureKind {
    /// Input matched the deny-list or referenced a name outside the allow-list
    Denied,
    /// Input failed the syntax pre-check or could not be parsed
    Syntax,
    /// Subprocess exceeded its wall-clock budget
    Timeout,
    /// Execution started but failed
    Runtime,
    /// Tool unknown or switched off
    Disabled,
    /// Missing or malformed arguments
    InvalidInput,
}

/// Result of a tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    /// Whether the tool succeeded
    pub success: bool,
    /// Captured output on success (may also carry partial output on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Error text on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ToolFailureKind>,
    /// Numeric result of an expression evaluation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<f64>,
    /// Process exit code, when a subprocess ran to completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl ToolOutcome {
    /// Successful outcome
    #[must_use]
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            error: None,
            failure: None,
            result: None,
            exit_code: None,
            duration_ms: 0,
        }
    }

    /// Failed outcome
    #[must_use]
    pub fn failure(kind: ToolFailureKind, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
            failure: Some(kind),
            result: None,
            exit_code: None,
            duration_ms: 0,
        }
    }

    /// Attach a numeric result
    #[must_use]
    pub fn with_result(mut self, value: f64) -> Self {
        self.result = Some(value);
        self
    }

    /// Attach a process exit code
    #[must_use]
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    /// Attach output text
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Set the measured duration
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Error text, or a generic message for failures without one
    #[must_use]
    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "unknown tool error".to_string())
    }
}
