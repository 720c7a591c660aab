//! Tool executor
//!
//! Entry point used by the agentic loop. Dispatches by tool name and
//! turns every failure into a structured [`ToolOutcome`].

use crate::calculator::{self, format_number};
use crate::error::Error;
use crate::outcome::{ToolFailureKind, ToolOutcome};
use crate::sandbox::{CodeSandbox, SandboxConfig};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Code execution tool name
pub const EXECUTE_CODE: &str = "execute_code";

/// Expression evaluation tool name
pub const EVALUATE_EXPRESSION: &str = "evaluate_expression";

/// Description of an available tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    /// Tool name
    pub name: &'static str,
    /// Human readable description
    pub description: &'static str,
    /// Whether the tool is switched on
    pub enabled: bool,
}

/// Executor configuration
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Sandbox settings for code execution
    pub sandbox: SandboxConfig,
    /// Enable `execute_code`
    pub code_execution: bool,
    /// Enable `evaluate_expression`
    pub expression_evaluation: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            sandbox: SandboxConfig::default(),
            code_execution: true,
            expression_evaluation: true,
        }
    }
}

/// Runs code on behalf of the agentic loop
///
/// Kept as a trait so the loop can be driven by a scripted runner in tests.
#[async_trait::async_trait]
pub trait CodeRunner: Send + Sync {
    /// Execute a code block and report the outcome
    async fn run_code(&self, code: &str) -> ToolOutcome;
}

/// Tool executor
#[derive(Debug, Clone, Default)]
pub struct ToolExecutor {
    sandbox: CodeSandbox,
    config: ExecutorConfig,
}

impl ToolExecutor {
    /// Create an executor
    #[must_use]
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            sandbox: CodeSandbox::new(config.sandbox.clone()),
            config,
        }
    }

    /// Tools this executor knows about
    #[must_use]
    pub fn available_tools(&self) -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor {
                name: EXECUTE_CODE,
                description: "Execute Python code in a sandboxed subprocess",
                enabled: self.config.code_execution,
            },
            ToolDescriptor {
                name: EVALUATE_EXPRESSION,
                description: "Evaluate an arithmetic expression with math functions",
                enabled: self.config.expression_evaluation,
            },
        ]
    }

    /// Execute code in the sandbox
    #[instrument(skip(self, code), fields(code_len = code.len()))]
    pub async fn execute_code(&self, code: &str) -> ToolOutcome {
        if !self.config.code_execution {
            return disabled(EXECUTE_CODE);
        }
        let outcome = self.sandbox.execute(code).await;
        info!(
            success = outcome.success,
            failure = ?outcome.failure,
            duration_ms = outcome.duration_ms,
            "Code executed"
        );
        outcome
    }

    /// Evaluate an arithmetic expression
    #[instrument(skip(self))]
    pub fn evaluate_expression(&self, expression: &str) -> ToolOutcome {
        if !self.config.expression_evaluation {
            return disabled(EVALUATE_EXPRESSION);
        }

        let started = Instant::now();
        let outcome = match calculator::evaluate(expression) {
            Ok(value) => ToolOutcome::success(format_number(value)).with_result(value),
            Err(Error::Denied(reason)) => ToolOutcome::failure(ToolFailureKind::Denied, reason),
            Err(Error::InvalidInput(reason)) => {
                ToolOutcome::failure(ToolFailureKind::Syntax, reason)
            }
            Err(e) => ToolOutcome::failure(ToolFailureKind::Runtime, e.to_string()),
        };
        debug!(success = outcome.success, "Expression evaluated");
        outcome.with_duration_ms(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX))
    }

    /// Dispatch a tool call by name
    ///
    /// `execute_code` reads `args.code`; `evaluate_expression` reads
    /// `args.expression`.
    pub async fn execute_tool(&self, name: &str, args: &Value) -> ToolOutcome {
        match name {
            EXECUTE_CODE => match args.get("code").and_then(Value::as_str) {
                Some(code) => self.execute_code(code).await,
                None => ToolOutcome::failure(
                    ToolFailureKind::InvalidInput,
                    "missing string argument 'code'",
                ),
            },
            EVALUATE_EXPRESSION => match args.get("expression").and_then(Value::as_str) {
                Some(expression) => self.evaluate_expression(expression),
                None => ToolOutcome::failure(
                    ToolFailureKind::InvalidInput,
                    "missing string argument 'expression'",
                ),
            },
            other => ToolOutcome::failure(
                ToolFailureKind::Disabled,
                format!("Tool '{other}' is not available"),
            ),
        }
    }
}

fn disabled(name: &str) -> ToolOutcome {
    ToolOutcome::failure(
        ToolFailureKind::Disabled,
        format!("Tool '{name}' is not enabled"),
    )
}

#[async_trait::async_trait]
impl CodeRunner for ToolExecutor {
    async fn run_code(&self, code: &str) -> ToolOutcome {
        self.execute_code(code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_dispatch_expression() {
        let executor = ToolExecutor::default();
        let outcome = executor
            .execute_tool(EVALUATE_EXPRESSION, &json!({"expression": "factorial(5)"}))
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.result, Some(120.0));
        assert_eq!(outcome.output.as_deref(), Some("120"));
    }

    #[tokio::test]
    async fn test_dispatch_denied_code_never_runs() {
        let executor = ToolExecutor::default();
        let outcome = executor
            .execute_tool(EXECUTE_CODE, &json!({"code": "import subprocess\nsubprocess.run(['ls'])"}))
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.failure, Some(ToolFailureKind::Denied));
        assert_eq!(outcome.exit_code, None);
    }

    #[tokio::test]
    async fn test_dispatch_missing_argument() {
        let executor = ToolExecutor::default();
        let outcome = executor.execute_tool(EXECUTE_CODE, &json!({})).await;
        assert_eq!(outcome.failure, Some(ToolFailureKind::InvalidInput));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_disabled() {
        let executor = ToolExecutor::default();
        let outcome = executor.execute_tool("web_search", &json!({"query": "x"})).await;
        assert_eq!(outcome.failure, Some(ToolFailureKind::Disabled));
    }

    #[tokio::test]
    async fn test_switched_off_tools() {
        let executor = ToolExecutor::new(ExecutorConfig {
            code_execution: false,
            expression_evaluation: false,
            ..ExecutorConfig::default()
        });
        assert_eq!(
            executor.execute_code("print(1)").await.failure,
            Some(ToolFailureKind::Disabled)
        );
        assert_eq!(
            executor.evaluate_expression("1 + 1").failure,
            Some(ToolFailureKind::Disabled)
        );
        assert!(executor.available_tools().iter().all(|tool| !tool.enabled));
    }

    #[test]
    fn test_expression_denial_classified() {
        let executor = ToolExecutor::default();
        let outcome = executor.evaluate_expression("__import__('os')");
        assert_eq!(outcome.failure, Some(ToolFailureKind::Denied));
        let outcome = executor.evaluate_expression("1 +");
        assert_eq!(outcome.failure, Some(ToolFailureKind::Syntax));
        let outcome = executor.evaluate_expression("1 / 0");
        assert_eq!(outcome.failure, Some(ToolFailureKind::Runtime));
    }
}
