//! Execution planner
//!
//! A pure, table-driven mapping from category to plan. Image analysis
//! adds the vision waterfall choice; the sentiment override produces a
//! separate escalated plan.

use super::patterns::VISION_PRECISION_KEYWORDS;
use super::TaskCategory;
use cortex_tools::{EVALUATE_EXPRESSION, EXECUTE_CODE};
use serde::{Deserialize, Serialize};

/// How the agentic loop runs a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One worker call
    DirectResponse,
    /// One worker call, reasoning-oriented worker
    ChainOfThought,
    /// Generate, execute, feed errors back
    SelfCorrecting,
    /// One call to the math worker
    MathematicalSolver,
    /// High-quality vision with one downgrade retry
    WaterfallVision,
}

impl Strategy {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectResponse => "direct_response",
            Self::ChainOfThought => "chain_of_thought",
            Self::SelfCorrecting => "self_correcting",
            Self::MathematicalSolver => "mathematical_solver",
            Self::WaterfallVision => "waterfall_vision",
        }
    }
}

/// Routing decision for one request; built fresh and never mutated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    /// Category the plan was built for
    pub category: TaskCategory,
    /// Worker to call
    pub worker_id: String,
    /// Whether the strategy uses tools
    pub requires_tools: bool,
    /// Iteration budget
    pub max_iterations: u32,
    /// Execution strategy
    pub strategy: Strategy,
    /// Tools the worker may use
    pub tool_list: Vec<String>,
    /// Built by the sentiment override
    pub escalated: bool,
}

/// Worker names and budgets used by the plan table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Generalist worker (simple chat and universal fallback)
    pub generalist_worker: String,
    /// Code and reasoning worker
    pub logic_worker: String,
    /// Math worker
    pub math_worker: String,
    /// Fast, cheap vision worker
    pub vision_fast_worker: String,
    /// High-quality vision worker
    pub vision_pro_worker: String,
    /// Most capable worker, forced by the sentiment override
    pub escalation_worker: String,
    /// Self-correcting iteration budget for code generation
    pub code_max_iterations: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            generalist_worker: "orchestrator".to_string(),
            logic_worker: "worker_logic".to_string(),
            math_worker: "worker_math".to_string(),
            vision_fast_worker: "worker_vision_fast".to_string(),
            vision_pro_worker: "worker_vision_pro".to_string(),
            escalation_worker: "worker_logic".to_string(),
            code_max_iterations: 3,
        }
    }
}

/// Whether `message` asks for precision that needs the high-quality vision worker
#[must_use]
pub fn needs_precise_vision(message: &str) -> bool {
    let lower = message.to_lowercase();
    VISION_PRECISION_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Table-driven planner
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlanner {
    config: PlannerConfig,
}

impl ExecutionPlanner {
    /// Create a planner
    #[must_use]
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Planner configuration
    #[must_use]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Vision worker for `message` (the waterfall's starting tier)
    #[must_use]
    pub fn vision_worker(&self, message: &str) -> &str {
        if needs_precise_vision(message) {
            &self.config.vision_pro_worker
        } else {
            &self.config.vision_fast_worker
        }
    }

    /// Build the plan for a category
    #[must_use]
    pub fn plan(&self, category: TaskCategory, message: &str, has_image: bool) -> ExecutionPlan {
        let c = &self.config;
        let (worker, tools, max_iterations, strategy) = match category {
            TaskCategory::CodeGeneration => (
                c.logic_worker.as_str(),
                vec![EXECUTE_CODE],
                c.code_max_iterations,
                Strategy::SelfCorrecting,
            ),
            TaskCategory::MathCalculation => (
                c.math_worker.as_str(),
                vec![EVALUATE_EXPRESSION],
                2,
                Strategy::MathematicalSolver,
            ),
            TaskCategory::ImageAnalysis => (
                self.vision_worker(message),
                Vec::new(),
                1,
                Strategy::WaterfallVision,
            ),
            TaskCategory::ComplexReasoning => (
                c.logic_worker.as_str(),
                Vec::new(),
                2,
                Strategy::ChainOfThought,
            ),
            TaskCategory::ToolExecution => (
                c.logic_worker.as_str(),
                vec![EXECUTE_CODE, EVALUATE_EXPRESSION],
                c.code_max_iterations,
                Strategy::SelfCorrecting,
            ),
            TaskCategory::SimpleChat => (
                c.generalist_worker.as_str(),
                Vec::new(),
                1,
                Strategy::DirectResponse,
            ),
        };

        // An image always needs a vision-capable worker, whatever the category.
        let (worker, tools, max_iterations, strategy) =
            if has_image && category != TaskCategory::ImageAnalysis {
                (self.vision_worker(message), Vec::new(), 1, Strategy::WaterfallVision)
            } else {
                (worker, tools, max_iterations, strategy)
            };

        ExecutionPlan {
            category,
            worker_id: worker.to_string(),
            requires_tools: !tools.is_empty(),
            max_iterations,
            strategy,
            tool_list: tools.into_iter().map(str::to_string).collect(),
            escalated: false,
        }
    }

    /// Plan forced by the sentiment override
    ///
    /// Keeps the category for reporting but routes to the most capable
    /// worker (the high-quality vision worker when an image is present).
    #[must_use]
    pub fn escalated(&self, category: TaskCategory, has_image: bool) -> ExecutionPlan {
        let (worker, strategy) = if has_image {
            (&self.config.vision_pro_worker, Strategy::WaterfallVision)
        } else {
            (&self.config.escalation_worker, Strategy::ChainOfThought)
        };

        ExecutionPlan {
            category,
            worker_id: worker.clone(),
            requires_tools: false,
            max_iterations: 1,
            strategy,
            tool_list: Vec::new(),
            escalated: true,
        }
    }
}
