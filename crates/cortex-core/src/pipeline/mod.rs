//! Request pipeline
//!
//! One request flows through:
//!
//! 1. PII redaction of every user message (one shared mapping)
//! 2. Sentiment scoring of the last user message
//! 3. Profile and memory context injection
//! 4. Detached prefetch
//! 5. Classification, planning (or the sentiment override) and the
//!    agentic loop, or a direct call for literal models
//! 6. Universal fallback on any error, then the static response
//! 7. PII restoration, detached memory write-back, metrics
//!
//! The pipeline never returns an error; the worst case is the static
//! apology response.

pub mod config;
pub mod request;


pub use config::PipelineConfig;
pub use request::{PipelineOutput, PipelineRequest, ANONYMOUS_USER, AUTO_MODEL};

use crate::agentic::{AgenticLoop, ExecutionTrace};
use crate::background::BackgroundTasks;
use crate::cache::{CacheStore, InMemoryCache};
use crate::error::{Error, Result};
use crate::event_bus::{EventBus, PipelineEvent};
use crate::memory::{inject_context, prepend_system, MemorySummarizer, NoopMemory, VectorMemory};
use crate::metrics::PipelineMetrics;
use crate::pii::{restore, PiiMapping, PiiRedactor};
use crate::prefetch::{detect_workflow, PrefetchContext, Prefetcher};
use crate::profile::ProfileStore;
use crate::routing::{ExecutionPlan, ExecutionPlanner, PlannerConfig, TaskCategory, TaskClassifier};
use crate::sentiment::{VaderScorer, SentimentBreaker, SentimentScorer};
use crate::workers::{SharedWorkerRegistry, WorkerDispatcher};
use cortex_llm::{
    contains_image, last_user_text, ChatCompletion, CompletionRequest, CompletionService, Message,
    MessageRole,
};
use cortex_tools::{CodeRunner, ToolExecutor};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Text of the last-resort response
pub const STATIC_FALLBACK_MESSAGE: &str =
    "I apologize, but I'm experiencing technical difficulties. Please try again later.";

/// Model name reported by the last-resort response
pub const STATIC_FALLBACK_MODEL: &str = "orchestrator-fallback";

/// Last-resort response for `request_id`
#[must_use]
pub fn static_fallback(request_id: &str) -> ChatCompletion {
    ChatCompletion::from_text(
        format!("fallback-{request_id}"),
        STATIC_FALLBACK_MODEL,
        STATIC_FALLBACK_MESSAGE,
        "error",
    )
}

fn pii_cache_key(request_id: &str) -> String {
    format!("pii:{request_id}")
}

// ============================================================================
// Builder
// ============================================================================

/// Assembles a [`RequestPipeline`] from its collaborators
pub struct PipelineBuilder {
    completion: Arc<dyn CompletionService>,
    registry: SharedWorkerRegistry,
    runner: Option<Arc<dyn CodeRunner>>,
    cache: Option<Arc<dyn CacheStore>>,
    memory: Option<Arc<dyn VectorMemory>>,
    scorer: Option<Arc<dyn SentimentScorer>>,
    planner: PlannerConfig,
    config: PipelineConfig,
    events: EventBus,
    metrics: PipelineMetrics,
}

impl PipelineBuilder {
    /// Start with the two required collaborators
    pub fn new(completion: Arc<dyn CompletionService>, registry: SharedWorkerRegistry) -> Self {
        Self {
            completion,
            registry,
            runner: None,
            cache: None,
            memory: None,
            scorer: None,
            planner: PlannerConfig::default(),
            config: PipelineConfig::default(),
            events: EventBus::default(),
            metrics: PipelineMetrics::default(),
        }
    }

    /// Code runner for the self-correcting loop (default: [`ToolExecutor`])
    #[must_use]
    pub fn with_code_runner(mut self, runner: Arc<dyn CodeRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Cache store (default: in-process)
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Vector memory (default: none)
    #[must_use]
    pub fn with_memory(mut self, memory: Arc<dyn VectorMemory>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Sentiment scorer (default: VADER)
    #[must_use]
    pub fn with_sentiment_scorer(mut self, scorer: Arc<dyn SentimentScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Planner worker names and budgets
    #[must_use]
    pub fn with_planner(mut self, planner: PlannerConfig) -> Self {
        self.planner = planner;
        self
    }

    /// Pipeline settings
    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Event bus shared with other components
    #[must_use]
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Metrics shared with other components
    #[must_use]
    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Build the pipeline
    #[must_use]
    pub fn build(self) -> RequestPipeline {
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(InMemoryCache::new()) as Arc<dyn CacheStore>);
        let runner = self
            .runner
            .unwrap_or_else(|| Arc::new(ToolExecutor::default()) as Arc<dyn CodeRunner>);
        let scorer = self
            .scorer
            .unwrap_or_else(|| Arc::new(VaderScorer) as Arc<dyn SentimentScorer>);

        let dispatcher = WorkerDispatcher::new(
            self.registry,
            self.completion.clone(),
            self.planner.generalist_worker.clone(),
        );
        let agentic = AgenticLoop::new(dispatcher.clone(), runner, &self.planner)
            .with_events(self.events.clone())
            .with_metrics(self.metrics.clone());

        RequestPipeline {
            redactor: PiiRedactor::new(self.config.redaction_mode),
            sentiment: SentimentBreaker::new(scorer, self.config.sentiment_threshold),
            classifier: TaskClassifier::new(),
            planner: ExecutionPlanner::new(self.planner),
            dispatcher,
            agentic,
            profiles: ProfileStore::new(cache.clone()),
            prefetcher: Prefetcher::new(cache.clone()).with_ttl(self.config.prefetch_ttl),
            summarizer: MemorySummarizer::new(self.completion, self.config.summarizer_model.clone()),
            memory: self.memory.unwrap_or_else(|| Arc::new(NoopMemory)),
            cache,
            background: BackgroundTasks::new(),
            events: self.events,
            metrics: self.metrics,
            config: self.config,
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Request orchestration pipeline
///
/// Cheap to share behind an `Arc`; holds no per-request state.
pub struct RequestPipeline {
    redactor: PiiRedactor,
    sentiment: SentimentBreaker,
    classifier: TaskClassifier,
    planner: ExecutionPlanner,
    dispatcher: WorkerDispatcher,
    agentic: AgenticLoop,
    cache: Arc<dyn CacheStore>,
    profiles: ProfileStore,
    memory: Arc<dyn VectorMemory>,
    summarizer: MemorySummarizer,
    prefetcher: Prefetcher,
    background: BackgroundTasks,
    events: EventBus,
    metrics: PipelineMetrics,
    config: PipelineConfig,
}

impl RequestPipeline {
    /// Start building a pipeline
    pub fn builder(
        completion: Arc<dyn CompletionService>,
        registry: SharedWorkerRegistry,
    ) -> PipelineBuilder {
        PipelineBuilder::new(completion, registry)
    }

    /// Worker registry handle
    #[must_use]
    pub fn registry(&self) -> &SharedWorkerRegistry {
        self.dispatcher.registry()
    }

    /// Classifier
    #[must_use]
    pub fn classifier(&self) -> &TaskClassifier {
        &self.classifier
    }

    /// Planner
    #[must_use]
    pub fn planner(&self) -> &ExecutionPlanner {
        &self.planner
    }

    /// Cache store
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    /// Prefetcher
    #[must_use]
    pub fn prefetcher(&self) -> &Prefetcher {
        &self.prefetcher
    }

    /// Background job queue
    #[must_use]
    pub fn background(&self) -> &BackgroundTasks {
        &self.background
    }

    /// Event bus
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Metrics
    #[must_use]
    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process one request
    #[instrument(skip(self, request), fields(user_id = %request.user, model = %request.model))]
    pub async fn process(&self, request: PipelineRequest) -> PipelineOutput {
        let request_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        self.metrics.request_started();
        self.events.publish(PipelineEvent::RequestStarted {
            request_id: request_id.clone(),
            model: request.model.clone(),
        });
        info!(
            request_id = %request_id,
            message_count = request.messages.len(),
            "Request started"
        );

        let original_text = last_user_text(&request.messages);
        let has_image = contains_image(&request.messages);

        // PII redaction precedes every external call
        let (mut messages, mapping) = self.redact_messages(&request.messages);
        if !mapping.is_empty() {
            self.metrics.pii_redacted(mapping.len());
            info!(
                request_id = %request_id,
                count = mapping.len(),
                types = ?mapping.types(),
                "PII redacted"
            );
            self.cache_pii_mapping(&request_id, &mapping).await;
        }
        let redacted_text = last_user_text(&messages);

        let (sentiment_score, sentiment_override) = if request.is_auto() {
            let score = self.sentiment.analyze(&original_text);
            (score, self.sentiment.should_override(score))
        } else {
            (0.0, false)
        };

        let profile = self.profiles.get(&request.user).await;
        prepend_system(&mut messages, &profile.render());
        let contexts = self.retrieve_memory(&request.user, &redacted_text).await;
        inject_context(&mut messages, &contexts);

        self.schedule_prefetch(&redacted_text, &request.user);

        let mut trace = ExecutionTrace::new();
        let mut category = None;
        let mut plan = None;

        let primary = if request.is_auto() {
            let routed = self.route(
                &request_id,
                &redacted_text,
                has_image,
                sentiment_score,
                sentiment_override,
                &mut trace,
            );
            category = Some(routed.category);
            let result = self
                .within_deadline(async {
                    self.agentic
                        .run(&routed, &messages, &request_id, &mut trace)
                        .await
                        .into_result()
                })
                .await;
            plan = Some(routed);
            result
        } else {
            info!(request_id = %request_id, model = %request.model, "Bypassing routing");
            self.within_deadline(self.dispatcher.call_model(self.bypass_request(&request, &messages)))
                .await
        };

        let (mut response, fallback_used) = match primary {
            Ok(response) => (response, false),
            Err(e) => (self.fallback(&request_id, &messages, &e).await, true),
        };

        let redacted_answer = response.content();
        if !mapping.is_empty() {
            for choice in &mut response.choices {
                choice.message.map_text(|text| restore(text, &mapping));
            }
        }

        self.schedule_memory_write_back(&request.user, &request_id, redacted_text, redacted_answer);

        let latency_ms = started.elapsed().as_millis() as u64;
        let category_label = category.map_or("bypass", |c: TaskCategory| c.as_str());
        self.metrics.request_finished(
            category_label,
            latency_ms,
            response.usage.total_tokens,
            fallback_used,
        );
        self.events.publish(PipelineEvent::RequestCompleted {
            request_id: request_id.clone(),
            latency_ms,
        });
        info!(
            request_id = %request_id,
            task_type = category_label,
            model = %response.model,
            latency_ms,
            total_tokens = response.usage.total_tokens,
            fallback_used,
            steps = trace.len(),
            "Request completed"
        );

        PipelineOutput {
            request_id,
            response,
            category,
            plan,
            sentiment_score,
            sentiment_override,
            fallback_used,
            trace,
            latency_ms,
        }
    }

    fn redact_messages(&self, messages: &[Message]) -> (Vec<Message>, PiiMapping) {
        let mut mapping = PiiMapping::default();
        let redacted = messages
            .iter()
            .cloned()
            .map(|mut message| {
                if message.role == MessageRole::User {
                    message.map_text(|text| self.redactor.redact_into(text, &mut mapping));
                }
                message
            })
            .collect();
        (redacted, mapping)
    }

    async fn cache_pii_mapping(&self, request_id: &str, mapping: &PiiMapping) {
        let stored = match serde_json::to_string(mapping) {
            Ok(raw) => {
                self.cache
                    .set(&pii_cache_key(request_id), &raw, Some(self.config.pii_cache_ttl))
                    .await
            }
            Err(e) => Err(e.into()),
        };
        if let Err(e) = stored {
            warn!(request_id = %request_id, error = %e, "PII mapping not cached");
        }
    }

    async fn retrieve_memory(&self, user_id: &str, query: &str) -> Vec<String> {
        if !self.config.memory_enabled || query.is_empty() {
            return Vec::new();
        }
        match self
            .memory
            .retrieve(user_id, query, self.config.memory_top_k)
            .await
        {
            Ok(contexts) => {
                if !contexts.is_empty() {
                    self.metrics.memory_retrieved();
                }
                contexts
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Memory retrieval failed, continuing without context");
                Vec::new()
            }
        }
    }

    fn schedule_prefetch(&self, prompt: &str, user_id: &str) {
        let Some(workflow) = detect_workflow(prompt) else {
            return;
        };
        let prefetcher = self.prefetcher.clone();
        let context = PrefetchContext::from([("prompt".to_string(), prompt.to_string())]);
        let user_id = user_id.to_string();
        self.background.submit("prefetch", async move {
            prefetcher.prefetch(workflow, &context, &user_id).await;
            Ok(())
        });
    }

    fn schedule_memory_write_back(
        &self,
        user_id: &str,
        request_id: &str,
        question: String,
        answer: String,
    ) {
        if !self.config.memory_enabled {
            return;
        }
        let summarizer = self.summarizer.clone();
        let memory = self.memory.clone();
        let metrics = self.metrics.clone();
        let user_id = user_id.to_string();
        let request_id = request_id.to_string();
        self.background.submit("memory_write_back", async move {
            let Some(summary) = summarizer.summarize(&question, &answer).await else {
                return Ok(());
            };
            memory
                .store(&user_id, &summary, json!({ "request_id": request_id }))
                .await?;
            metrics.memory_stored();
            Ok(())
        });
    }

    fn route(
        &self,
        request_id: &str,
        message: &str,
        has_image: bool,
        sentiment_score: f64,
        sentiment_override: bool,
        trace: &mut ExecutionTrace,
    ) -> ExecutionPlan {
        let step = trace.begin(
            "analyze_request",
            json!({ "message_length": message.len(), "has_image": has_image }),
        );
        let classification = self.classifier.classify(message, has_image);
        trace.push(step.with_output(json!({
            "task_type": classification.category,
            "rule": classification.rule,
        })));

        let planned = self.planner.plan(classification.category, message, has_image);
        let plan = if sentiment_override {
            let escalated = self.planner.escalated(classification.category, has_image);
            warn!(
                request_id = %request_id,
                score = sentiment_score,
                original_worker = %planned.worker_id,
                override_worker = %escalated.worker_id,
                "Sentiment override"
            );
            self.metrics.sentiment_override();
            self.events.publish(PipelineEvent::SentimentOverride {
                request_id: request_id.to_string(),
                original_worker: planned.worker_id.clone(),
                override_worker: escalated.worker_id.clone(),
                score: sentiment_score,
            });
            escalated
        } else {
            planned
        };

        let step = trace.begin("create_plan", json!({ "task_type": classification.category }));
        trace.push(step.with_output(json!(plan)));

        info!(
            request_id = %request_id,
            task_type = %classification.category,
            worker = %plan.worker_id,
            strategy = plan.strategy.as_str(),
            escalated = plan.escalated,
            "Task classified"
        );
        self.events.publish(PipelineEvent::TaskClassified {
            request_id: request_id.to_string(),
            category: classification.category.as_str().to_string(),
            worker: plan.worker_id.clone(),
            strategy: plan.strategy.as_str().to_string(),
        });
        plan
    }

    fn bypass_request(&self, request: &PipelineRequest, messages: &[Message]) -> CompletionRequest {
        let mut completion = CompletionRequest::new(request.model.clone(), messages.to_vec())
            .with_user(request.user.clone());
        if let Some(max_tokens) = request.max_tokens {
            completion = completion.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            completion = completion.with_temperature(temperature);
        }
        completion
    }

    async fn within_deadline<F>(&self, primary: F) -> Result<ChatCompletion>
    where
        F: Future<Output = Result<ChatCompletion>>,
    {
        match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, primary)
                .await
                .unwrap_or_else(|_| Err(Error::DeadlineExceeded(limit.as_millis() as u64))),
            None => primary.await,
        }
    }

    async fn fallback(&self, request_id: &str, messages: &[Message], cause: &Error) -> ChatCompletion {
        warn!(request_id = %request_id, error = %cause, "Primary path failed, using fallback");
        self.metrics.fallback_used();

        let generalist = self.dispatcher.generalist().to_string();
        let (response, static_response) = match self
            .dispatcher
            .call_worker(&generalist, messages, request_id)
            .await
        {
            Ok(response) => (response, false),
            Err(e) => {
                error!(request_id = %request_id, error = %e, "Fallback failed, returning static response");
                (static_fallback(request_id), true)
            }
        };

        self.events.publish(PipelineEvent::FallbackUsed {
            request_id: request_id.to_string(),
            reason: cause.to_string(),
            static_response,
        });
        response
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("dispatcher", &self.dispatcher)
            .field("cache", &self.cache.backend())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
