//! Agentic loop
//!
//! Runs an [`ExecutionPlan`] against the worker dispatcher. The
//! self-correcting strategy is a small state machine:
//!
//! ```text
//! Generate ──no code──▶ Done(Success)
//!    │
//!    └─code──▶ Execute ──all ok──▶ Done(Success)
//!                 │
//!                 └─failure──▶ Generate (error fed back) … until the budget
//!                                                         is spent ▶ Exhausted
//! ```

use super::code_blocks::{contains_code, extract_code_blocks};
use super::trace::ExecutionTrace;
use crate::error::{Error, Result};
use crate::event_bus::{EventBus, PipelineEvent};
use crate::metrics::PipelineMetrics;
use crate::routing::{ExecutionPlan, PlannerConfig, Strategy};
use crate::workers::WorkerDispatcher;
use cortex_llm::{ChatCompletion, Message};
use cortex_tools::CodeRunner;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// How a loop run ended
#[derive(Debug)]
pub enum LoopOutcome {
    /// The final iteration produced no execution error
    Success(ChatCompletion),
    /// The iteration budget ran out with errors outstanding; last response
    Exhausted(ChatCompletion),
    /// A worker call failed with no retry left
    Fatal(Error),
}

impl LoopOutcome {
    /// Response for `Success`/`Exhausted`, error for `Fatal`
    pub fn into_result(self) -> Result<ChatCompletion> {
        match self {
            Self::Success(response) | Self::Exhausted(response) => Ok(response),
            Self::Fatal(e) => Err(e),
        }
    }

    /// Whether the run ended in `Success`
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

fn correction_message(error: &str) -> Message {
    Message::user(format!(
        "The code execution failed with error: {error}. Please fix the code."
    ))
}

/// Executes plans
#[derive(Clone)]
pub struct AgenticLoop {
    dispatcher: WorkerDispatcher,
    runner: Arc<dyn CodeRunner>,
    events: EventBus,
    metrics: PipelineMetrics,
    vision_fast_worker: String,
    vision_pro_worker: String,
}

impl AgenticLoop {
    /// Create a loop; vision tier names come from the planner config
    pub fn new(
        dispatcher: WorkerDispatcher,
        runner: Arc<dyn CodeRunner>,
        planner: &PlannerConfig,
    ) -> Self {
        Self {
            dispatcher,
            runner,
            events: EventBus::default(),
            metrics: PipelineMetrics::default(),
            vision_fast_worker: planner.vision_fast_worker.clone(),
            vision_pro_worker: planner.vision_pro_worker.clone(),
        }
    }

    /// Publish events on `events`
    #[must_use]
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Record into `metrics`
    #[must_use]
    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Run `plan`, appending steps to `trace`
    #[instrument(skip(self, messages, trace), fields(worker = %plan.worker_id, strategy = plan.strategy.as_str()))]
    pub async fn run(
        &self,
        plan: &ExecutionPlan,
        messages: &[Message],
        request_id: &str,
        trace: &mut ExecutionTrace,
    ) -> LoopOutcome {
        match plan.strategy {
            Strategy::SelfCorrecting => {
                self.run_self_correcting(plan, messages, request_id, trace)
                    .await
            }
            Strategy::WaterfallVision => {
                self.run_vision(&plan.worker_id, messages, request_id, trace)
                    .await
            }
            Strategy::MathematicalSolver => {
                self.run_single("math_calculation", &plan.worker_id, messages, request_id, trace)
                    .await
            }
            Strategy::ChainOfThought => {
                self.run_single("chain_of_thought", &plan.worker_id, messages, request_id, trace)
                    .await
            }
            Strategy::DirectResponse => {
                self.run_single("direct_response", &plan.worker_id, messages, request_id, trace)
                    .await
            }
        }
    }

    async fn run_single(
        &self,
        action: &str,
        worker: &str,
        messages: &[Message],
        request_id: &str,
        trace: &mut ExecutionTrace,
    ) -> LoopOutcome {
        let step = trace.begin(action, json!({ "worker": worker }));
        match self.dispatcher.call_worker(worker, messages, request_id).await {
            Ok(response) => {
                trace.push(step.with_output(json!({ "success": true })));
                LoopOutcome::Success(response)
            }
            Err(e) => {
                trace.push(step.with_error(e.to_string()));
                LoopOutcome::Fatal(e)
            }
        }
    }

    async fn run_self_correcting(
        &self,
        plan: &ExecutionPlan,
        messages: &[Message],
        request_id: &str,
        trace: &mut ExecutionTrace,
    ) -> LoopOutcome {
        let worker = plan.worker_id.as_str();
        let max_iterations = plan.max_iterations.max(1);
        let mut working = messages.to_vec();

        info!(request_id = %request_id, worker = %worker, max_iterations, "Coding agent started");

        let mut iteration = 0;
        loop {
            iteration += 1;
            let is_last = iteration == max_iterations;
            let step = trace.begin(
                format!("generate_code_iteration_{iteration}"),
                json!({ "messages": working.len() }),
            );

            let response = match self.dispatcher.call_worker(worker, &working, request_id).await {
                Ok(response) => response,
                Err(e) => {
                    error!(request_id = %request_id, iteration, error = %e, "Coding iteration failed");
                    trace.push(step.with_error(e.to_string()));
                    if is_last {
                        return LoopOutcome::Fatal(e);
                    }
                    continue;
                }
            };

            let content = response.content();
            let has_code = contains_code(&content);
            trace.push(step.with_output(json!({
                "response_length": content.len(),
                "has_code": has_code,
            })));

            let mut failures = 0usize;
            if has_code {
                for (index, block) in extract_code_blocks(&content).iter().enumerate() {
                    let exec_step = trace.begin(
                        format!("execute_code_block_{}", index + 1),
                        json!({ "code_length": block.len() }),
                    );
                    let outcome = self.runner.run_code(block).await;
                    let exec_step = exec_step.with_output(json!({
                        "success": outcome.success,
                        "output_length": outcome.output.as_deref().map_or(0, str::len),
                    }));

                    if outcome.success {
                        trace.push(exec_step);
                    } else {
                        let message = outcome.error_message();
                        failures += 1;
                        working.push(correction_message(&message));
                        trace.push(exec_step.with_error(message));
                    }
                }
            }

            if failures == 0 {
                info!(request_id = %request_id, iteration, "Coding agent finished");
                return LoopOutcome::Success(response);
            }
            if is_last {
                warn!(
                    request_id = %request_id,
                    iterations = max_iterations,
                    failures,
                    "Coding agent exhausted its iteration budget"
                );
                return LoopOutcome::Exhausted(response);
            }
        }
    }

    async fn run_vision(
        &self,
        worker: &str,
        messages: &[Message],
        request_id: &str,
        trace: &mut ExecutionTrace,
    ) -> LoopOutcome {
        let primary = match self
            .run_single("vision_analysis", worker, messages, request_id, trace)
            .await
        {
            LoopOutcome::Fatal(e) => e,
            done => return done,
        };

        if worker != self.vision_pro_worker {
            return LoopOutcome::Fatal(primary);
        }

        let fallback = self.vision_fast_worker.as_str();
        warn!(
            request_id = %request_id,
            from_worker = %worker,
            to_worker = %fallback,
            error = %primary,
            "Vision worker failed, downgrading"
        );
        self.metrics.vision_downgrade();
        self.events.publish(PipelineEvent::VisionDowngrade {
            request_id: request_id.to_string(),
            from_worker: worker.to_string(),
            to_worker: fallback.to_string(),
        });

        match self
            .run_single("vision_analysis", fallback, messages, request_id, trace)
            .await
        {
            LoopOutcome::Fatal(second) => LoopOutcome::Fatal(Error::VisionEscalationExhausted {
                primary: primary.to_string(),
                fallback: second.to_string(),
            }),
            done => done,
        }
    }
}

impl std::fmt::Debug for AgenticLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgenticLoop")
            .field("dispatcher", &self.dispatcher)
            .field("vision_fast_worker", &self.vision_fast_worker)
            .field("vision_pro_worker", &self.vision_pro_worker)
            .finish_non_exhaustive()
    }
}
