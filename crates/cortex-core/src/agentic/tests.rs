//! Tests for the agentic loop

use super::*;
use crate::event_bus::{EventBus, PipelineEvent};
use crate::routing::{ExecutionPlanner, PlannerConfig, TaskCategory};
use crate::workers::{SharedWorkerRegistry, WorkerConfig, WorkerDispatcher, WorkerRegistry};
use crate::Error;
use cortex_llm::{Message, MessageRole, MockCompletionService};
use cortex_tools::{CodeRunner, ToolFailureKind, ToolOutcome};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Replays scripted outcomes; succeeds once the script runs out
#[derive(Default)]
struct ScriptedRunner {
    outcomes: Mutex<VecDeque<ToolOutcome>>,
    executed: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    fn with(outcomes: Vec<ToolOutcome>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            executed: Mutex::default(),
        })
    }

    fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CodeRunner for ScriptedRunner {
    async fn run_code(&self, code: &str) -> ToolOutcome {
        self.executed.lock().unwrap().push(code.to_string());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ToolOutcome::success("ok"))
    }
}

fn worker(model: &str) -> WorkerConfig {
    WorkerConfig {
        model: model.to_string(),
        provider: None,
        role: "Testing".to_string(),
        max_tokens: 100,
        temperature: 0.0,
        supports_tools: false,
        supports_vision: false,
        description: String::new(),
    }
}

fn dispatcher(mock: Arc<MockCompletionService>) -> WorkerDispatcher {
    let registry = WorkerRegistry::from_configs(HashMap::from([
        ("orchestrator".to_string(), worker("model-orchestrator")),
        ("worker_logic".to_string(), worker("model-logic")),
        ("worker_math".to_string(), worker("model-math")),
        ("worker_vision_fast".to_string(), worker("model-vision-fast")),
        ("worker_vision_pro".to_string(), worker("model-vision-pro")),
    ]));
    WorkerDispatcher::new(SharedWorkerRegistry::new(registry), mock, "orchestrator")
}

fn agentic(mock: Arc<MockCompletionService>, runner: Arc<ScriptedRunner>) -> AgenticLoop {
    AgenticLoop::new(dispatcher(mock), runner, &PlannerConfig::default())
}

fn code_reply(body: &str) -> String {
    format!("Here you go:\n```python\n{body}\n```\n")
}

fn user_messages() -> Vec<Message> {
    vec![Message::user("write a python function to sort a list")]
}

// ============================================================================
// Code blocks
// ============================================================================

#[test]
fn test_extract_code_blocks() {
    let content = "a\n```python\nprint(1)\n```\nb\n```\nx = 2\n```\n```rust\nfn main() {}\n```";
    assert!(contains_code(content));
    assert_eq!(extract_code_blocks(content), vec!["print(1)", "x = 2"]);
    assert!(!contains_code("no fences here"));
}

// ============================================================================
// Self-correcting
// ============================================================================

#[tokio::test]
async fn test_success_on_first_iteration() {
    let mock = Arc::new(MockCompletionService::new());
    mock.push_reply(code_reply("print(sorted([3, 1, 2]))"));
    let runner = ScriptedRunner::with(vec![]);
    let plan = ExecutionPlanner::default().plan(TaskCategory::CodeGeneration, "", false);

    let mut trace = ExecutionTrace::new();
    let outcome = agentic(mock.clone(), runner.clone())
        .run(&plan, &user_messages(), "req", &mut trace)
        .await;

    assert!(outcome.is_success());
    assert_eq!(mock.call_count(), 1);
    assert_eq!(runner.executed(), vec!["print(sorted([3, 1, 2]))"]);
    let actions: Vec<&str> = trace.steps().iter().map(|s| s.action.as_str()).collect();
    assert_eq!(actions, vec!["generate_code_iteration_1", "execute_code_block_1"]);
    assert_eq!(trace.steps()[1].step_number, 2);
}

#[tokio::test]
async fn test_failure_appends_exactly_one_correction() {
    let mock = Arc::new(MockCompletionService::new());
    mock.push_reply(code_reply("print(undefined)"));
    mock.push_reply(code_reply("print('fixed')"));
    let runner = ScriptedRunner::with(vec![ToolOutcome::failure(
        ToolFailureKind::Runtime,
        "NameError: name 'undefined' is not defined",
    )]);
    let plan = ExecutionPlanner::default().plan(TaskCategory::CodeGeneration, "", false);

    let mut trace = ExecutionTrace::new();
    let outcome = agentic(mock.clone(), runner)
        .run(&plan, &user_messages(), "req", &mut trace)
        .await;

    assert!(outcome.is_success());
    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    // system prompt + user on the first call; one correction added for the second
    assert_eq!(requests[0].messages.len(), 2);
    assert_eq!(requests[1].messages.len(), 3);
    let correction = &requests[1].messages[2];
    assert_eq!(correction.role, MessageRole::User);
    assert_eq!(
        correction.text(),
        "The code execution failed with error: NameError: name 'undefined' is not defined. Please fix the code."
    );
    assert_eq!(trace.errors().count(), 1);
}

#[tokio::test]
async fn test_persistent_errors_exhaust_budget() {
    let mock = Arc::new(MockCompletionService::new());
    for attempt in 0..3 {
        mock.push_reply(code_reply(&format!("raise ValueError({attempt})")));
    }
    let runner = ScriptedRunner::with(
        (0..3)
            .map(|i| ToolOutcome::failure(ToolFailureKind::Runtime, format!("ValueError: {i}")))
            .collect(),
    );
    let plan = ExecutionPlanner::default().plan(TaskCategory::CodeGeneration, "", false);

    let mut trace = ExecutionTrace::new();
    let outcome = agentic(mock.clone(), runner)
        .run(&plan, &user_messages(), "req", &mut trace)
        .await;

    match outcome {
        LoopOutcome::Exhausted(last) => assert!(last.content().contains("ValueError(2)")),
        other => panic!("expected Exhausted, got {other:?}"),
    }
    assert_eq!(mock.call_count(), 3);
    assert_eq!(trace.len(), 6);
}

#[tokio::test]
async fn test_response_without_code_finishes_immediately() {
    let mock = Arc::new(MockCompletionService::new());
    mock.push_reply("Use the built-in sorted() function.");
    let runner = ScriptedRunner::with(vec![]);
    let plan = ExecutionPlanner::default().plan(TaskCategory::CodeGeneration, "", false);

    let mut trace = ExecutionTrace::new();
    let outcome = agentic(mock.clone(), runner.clone())
        .run(&plan, &user_messages(), "req", &mut trace)
        .await;

    assert!(outcome.is_success());
    assert!(runner.executed().is_empty());
    assert_eq!(trace.len(), 1);
}

#[tokio::test]
async fn test_worker_failure_retries_until_last_iteration() {
    let mock = Arc::new(MockCompletionService::new());
    mock.push_failure("rate limited");
    mock.push_reply("All good, no code needed.");
    let plan = ExecutionPlanner::default().plan(TaskCategory::CodeGeneration, "", false);

    let mut trace = ExecutionTrace::new();
    let outcome = agentic(mock.clone(), ScriptedRunner::with(vec![]))
        .run(&plan, &user_messages(), "req", &mut trace)
        .await;
    assert!(outcome.is_success());
    assert_eq!(mock.call_count(), 2);
    assert!(trace.steps()[0].error.is_some());

    let failing = Arc::new(MockCompletionService::new());
    failing.fail_model("model-logic");
    let mut trace = ExecutionTrace::new();
    let outcome = agentic(failing.clone(), ScriptedRunner::with(vec![]))
        .run(&plan, &user_messages(), "req", &mut trace)
        .await;
    assert!(matches!(
        outcome,
        LoopOutcome::Fatal(Error::WorkerCallFailed { .. })
    ));
    assert_eq!(failing.call_count(), 3);
}

// ============================================================================
// Single-call strategies
// ============================================================================

#[tokio::test]
async fn test_direct_response_is_single_call() {
    let mock = Arc::new(MockCompletionService::new());
    mock.push_failure("down");
    let plan = ExecutionPlanner::default().plan(TaskCategory::SimpleChat, "", false);

    let mut trace = ExecutionTrace::new();
    let outcome = agentic(mock.clone(), ScriptedRunner::with(vec![]))
        .run(&plan, &[Message::user("hi")], "req", &mut trace)
        .await;

    assert!(matches!(outcome, LoopOutcome::Fatal(_)));
    assert_eq!(mock.call_count(), 1);
    assert_eq!(trace.steps()[0].action, "direct_response");
}

#[tokio::test]
async fn test_math_and_reasoning_use_their_workers() {
    let mock = Arc::new(MockCompletionService::new());
    let planner = ExecutionPlanner::default();
    let agent = agentic(mock.clone(), ScriptedRunner::with(vec![]));
    let mut trace = ExecutionTrace::new();

    let math = planner.plan(TaskCategory::MathCalculation, "", false);
    agent.run(&math, &[Message::user("2+2")], "req", &mut trace).await;
    let reasoning = planner.plan(TaskCategory::ComplexReasoning, "", false);
    agent.run(&reasoning, &[Message::user("why")], "req", &mut trace).await;

    assert_eq!(mock.requested_models(), vec!["model-math", "model-logic"]);
    assert_eq!(trace.steps()[0].action, "math_calculation");
    assert_eq!(trace.steps()[1].action, "chain_of_thought");
}

// ============================================================================
// Vision waterfall
// ============================================================================

#[tokio::test]
async fn test_vision_pro_failure_downgrades_once() {
    let mock = Arc::new(MockCompletionService::new());
    mock.fail_model("model-vision-pro");
    let events = EventBus::new(8);
    let mut rx = events.subscribe();
    let plan = ExecutionPlanner::default().plan(
        TaskCategory::ImageAnalysis,
        "transcribe the handwriting",
        true,
    );
    assert_eq!(plan.worker_id, "worker_vision_pro");

    let mut trace = ExecutionTrace::new();
    let outcome = agentic(mock.clone(), ScriptedRunner::with(vec![]))
        .with_events(events)
        .run(&plan, &[Message::user("transcribe the handwriting")], "req", &mut trace)
        .await;

    assert!(outcome.is_success());
    assert_eq!(
        mock.requested_models(),
        vec!["model-vision-pro", "model-vision-fast"]
    );
    assert!(matches!(
        rx.recv().await.unwrap(),
        PipelineEvent::VisionDowngrade { ref to_worker, .. } if to_worker == "worker_vision_fast"
    ));
}

#[tokio::test]
async fn test_vision_both_tiers_fail() {
    let mock = Arc::new(MockCompletionService::new());
    mock.fail_model("model-vision-pro");
    mock.fail_model("model-vision-fast");
    let plan = ExecutionPlanner::default().plan(TaskCategory::ImageAnalysis, "handwriting", true);

    let mut trace = ExecutionTrace::new();
    let outcome = agentic(mock.clone(), ScriptedRunner::with(vec![]))
        .run(&plan, &[Message::user("handwriting")], "req", &mut trace)
        .await;

    assert!(matches!(
        outcome,
        LoopOutcome::Fatal(Error::VisionEscalationExhausted { .. })
    ));
    assert_eq!(mock.call_count(), 2);
    assert_eq!(trace.errors().count(), 2);
}

#[tokio::test]
async fn test_vision_fast_failure_propagates_directly() {
    let mock = Arc::new(MockCompletionService::new());
    mock.fail_model("model-vision-fast");
    let plan = ExecutionPlanner::default().plan(TaskCategory::ImageAnalysis, "what is this", true);

    let mut trace = ExecutionTrace::new();
    let outcome = agentic(mock.clone(), ScriptedRunner::with(vec![]))
        .run(&plan, &[Message::user("what is this")], "req", &mut trace)
        .await;

    assert!(matches!(
        outcome,
        LoopOutcome::Fatal(Error::WorkerCallFailed { .. })
    ));
    assert_eq!(mock.call_count(), 1);
}
