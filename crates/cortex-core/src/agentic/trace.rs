//! Execution trace

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// One recorded step of a request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgenticStep {
    /// 1-based position in the trace
    pub step_number: u32,
    /// What the step did (`generate_code_iteration_1`, `execute_code_block_2`, ...)
    pub action: String,
    /// Step input summary
    pub input: Value,
    /// Step output summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Error, when the step failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the step started
    pub timestamp: DateTime<Utc>,
}

impl AgenticStep {
    /// Attach an output summary
    #[must_use]
    pub fn with_output(mut self, output: Value) -> Self {
        self.output = Some(output);
        self
    }

    /// Mark the step as failed
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Ordered steps of one request
///
/// Owned by the caller of the loop so that steps recorded before a
/// deadline cancels the loop are still available afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExecutionTrace {
    steps: Vec<AgenticStep>,
}

impl ExecutionTrace {
    /// Empty trace
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a step numbered after the last recorded one
    #[must_use]
    pub fn begin(&self, action: impl Into<String>, input: Value) -> AgenticStep {
        AgenticStep {
            step_number: self.steps.len() as u32 + 1,
            action: action.into(),
            input,
            output: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Record a finished step
    pub fn push(&mut self, step: AgenticStep) {
        self.steps.push(step);
    }

    /// Recorded steps
    #[must_use]
    pub fn steps(&self) -> &[AgenticStep] {
        &self.steps
    }

    /// Number of steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps carrying an error
    pub fn errors(&self) -> impl Iterator<Item = &AgenticStep> {
        self.steps.iter().filter(|s| s.error.is_some())
    }
}
