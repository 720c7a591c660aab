//! Request routing
//!
//! - Patterns: literal pattern tables per category
//! - Classifier: scoring plus the fixed precedence rules
//! - Planner: category → execution plan, including the vision waterfall

pub mod classifier;
pub mod patterns;
pub mod planner;


use serde::{Deserialize, Serialize};
use std::fmt;

pub use classifier::{
    resolve, CategoryScore, ClassificationResult, DecisionRule, ScoreCard, TaskClassifier,
};
pub use planner::{needs_precise_vision, ExecutionPlan, ExecutionPlanner, PlannerConfig, Strategy};

/// Task category; exactly one per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    /// Conversation without a specialised need
    SimpleChat,
    /// Writing or fixing code
    CodeGeneration,
    /// Arithmetic, optimisation, business maths
    MathCalculation,
    /// Anything involving an image
    ImageAnalysis,
    /// Architecture, strategy, deep analysis
    ComplexReasoning,
    /// Explicit tool use
    ToolExecution,
}

impl TaskCategory {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SimpleChat => "simple_chat",
            Self::CodeGeneration => "code_generation",
            Self::MathCalculation => "math_calculation",
            Self::ImageAnalysis => "image_analysis",
            Self::ComplexReasoning => "complex_reasoning",
            Self::ToolExecution => "tool_execution",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
