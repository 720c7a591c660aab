//! Cortex Tools - Tool Executor
//!
//! This crate provides the tools available to the agentic loop:
//! - Sandbox: deny-list, syntax pre-check and subprocess execution with
//!   timeout and output cap
//! - Calculator: restricted expression evaluation over an allow-list
//! - Executor: by-name dispatch returning structured outcomes

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod calculator;
pub mod error;
pub mod executor;
pub mod outcome;
pub mod sandbox;

pub use error::{Error, Result};
pub use executor::{
    CodeRunner, ExecutorConfig, ToolDescriptor, ToolExecutor, EVALUATE_EXPRESSION, EXECUTE_CODE,
};
pub use outcome::{ToolFailureKind, ToolOutcome};
pub use sandbox::{CodeSandbox, SandboxConfig, SyntaxCheck};
