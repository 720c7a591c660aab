//! Cortex Core - Request Orchestration Engine
//!
//! This crate provides the orchestration logic between an OpenAI-style
//! client and a pool of specialised worker models, including:
//! - PII: reversible redaction of sensitive values before any external call
//! - Sentiment: circuit breaker that escalates distressed users
//! - Routing: pattern-based task classification and execution planning
//! - Workers: registry of named model configurations and dispatch
//! - Agentic: strategy execution (self-correcting code, vision waterfall)
//! - Memory and profiles: context injection and write-back
//! - Prefetch: predictive caching of likely follow-ups
//! - Pipeline: the end-to-end request flow with universal fallback

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agentic;
pub mod background;
pub mod cache;
pub mod error;
pub mod event_bus;
pub mod memory;
pub mod metrics;
pub mod pii;
pub mod pipeline;
pub mod prefetch;
pub mod profile;
pub mod routing;
pub mod sentiment;
pub mod workers;

pub use agentic::{AgenticLoop, AgenticStep, ExecutionTrace, LoopOutcome};
pub use background::BackgroundTasks;
pub use cache::{CacheStore, InMemoryCache, RedisCache};
pub use error::{Error, Result};
pub use event_bus::{EventBus, PipelineEvent};
pub use memory::{LocalMemory, MemorySummarizer, NoopMemory, VectorMemory};
pub use metrics::{MetricsRegistry, PipelineMetrics};
pub use pii::{restore, PiiMapping, PiiRedactor, PiiType, RedactionMode};
pub use pipeline::{
    PipelineBuilder, PipelineConfig, PipelineOutput, PipelineRequest, RequestPipeline,
    ANONYMOUS_USER, AUTO_MODEL,
};
pub use prefetch::{PrefetchContext, PrefetchOutcome, PrefetchPayload, Prefetcher};
pub use profile::{ProfileStore, UserProfile};
pub use routing::{
    ClassificationResult, DecisionRule, ExecutionPlan, ExecutionPlanner, PlannerConfig, Strategy,
    TaskCategory, TaskClassifier,
};
pub use sentiment::{SentimentBreaker, SentimentScorer, VaderScorer};
pub use workers::{SharedWorkerRegistry, Worker, WorkerConfig, WorkerDispatcher, WorkerRegistry};
