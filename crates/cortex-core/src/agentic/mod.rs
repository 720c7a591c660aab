//! Agentic loop executor
//!
//! - Trace: per-step record of what the loop did
//! - Code blocks: fenced-code detection and extraction
//! - Executor: strategy dispatch, self-correction and the vision waterfall

pub mod code_blocks;
pub mod executor;
pub mod trace;

#[cfg(test)]
mod tests;

pub use code_blocks::{contains_code, extract_code_blocks};
pub use executor::{AgenticLoop, LoopOutcome};
pub use trace::{AgenticStep, ExecutionTrace};
