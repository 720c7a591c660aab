//! Server configuration types
//!
//! Contains all configuration structures for the Cortex server, and the
//! mapping from them into the library crates' own config types.

use cortex_core::{PipelineConfig, PlannerConfig, RedactionMode, WorkerConfig};
use cortex_llm::OpenAiCompatConfig;
use cortex_tools::{ExecutorConfig, SandboxConfig, SyntaxCheck};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub pii: PiiConfig,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Persisted worker map (`workers.<name>`)
    #[serde(default)]
    pub workers: HashMap<String, WorkerConfig>,
}

fn default_true() -> bool {
    true
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bearer key required on `/v1/*` when set
    #[serde(default)]
    pub master_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            master_key: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
    /// Model used to summarise exchanges for memory write-back
    #[serde(default = "default_summarizer_model")]
    pub summarizer_model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: String::new(),
            timeout_secs: default_llm_timeout(),
            summarizer_model: default_summarizer_model(),
        }
    }
}

fn default_llm_base_url() -> String {
    "http://localhost:4000/v1".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_summarizer_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

impl LlmConfig {
    pub fn completion_config(&self) -> OpenAiCompatConfig {
        OpenAiCompatConfig::new(self.api_key.clone())
            .with_base_url(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// Cache backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    #[serde(default = "default_pii_ttl")]
    pub pii_ttl_secs: u64,
    #[serde(default = "default_prefetch_ttl")]
    pub prefetch_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            redis_url: default_redis_url(),
            pii_ttl_secs: default_pii_ttl(),
            prefetch_ttl_secs: default_prefetch_ttl(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_pii_ttl() -> u64 {
    300
}

fn default_prefetch_ttl() -> u64 {
    600
}

/// Sentiment circuit breaker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    #[serde(default = "default_sentiment_threshold")]
    pub threshold: f64,
    #[serde(default = "default_escalation_worker")]
    pub escalation_worker: String,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            threshold: default_sentiment_threshold(),
            escalation_worker: default_escalation_worker(),
        }
    }
}

fn default_sentiment_threshold() -> f64 {
    cortex_core::sentiment::DEFAULT_THRESHOLD
}

fn default_escalation_worker() -> String {
    "worker_logic".to_string()
}

/// Cross-request memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

/// Tool executor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_output")]
    pub max_output_chars: usize,
    /// Pre-check run before spawning (`python` or `structural`)
    #[serde(default)]
    pub syntax_check: SyntaxCheck,
    #[serde(default = "default_true")]
    pub code_execution: bool,
    #[serde(default = "default_true")]
    pub expression_evaluation: bool,
    /// Self-correcting iteration budget
    #[serde(default = "default_code_iterations")]
    pub code_max_iterations: u32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            timeout_secs: default_tool_timeout(),
            max_output_chars: default_max_output(),
            syntax_check: SyntaxCheck::default(),
            code_execution: true,
            expression_evaluation: true,
            code_max_iterations: default_code_iterations(),
        }
    }
}

fn default_interpreter() -> String {
    "python3".to_string()
}

fn default_tool_timeout() -> u64 {
    30
}

fn default_max_output() -> usize {
    10_000
}

fn default_code_iterations() -> u32 {
    3
}

impl ToolsConfig {
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            sandbox: SandboxConfig::default()
                .with_interpreter(self.interpreter.clone())
                .with_timeout(Duration::from_secs(self.timeout_secs))
                .with_max_output_chars(self.max_output_chars)
                .with_syntax_check(self.syntax_check),
            code_execution: self.code_execution,
            expression_evaluation: self.expression_evaluation,
        }
    }
}

/// PII engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PiiConfig {
    #[serde(default)]
    pub redaction_mode: RedactionMode,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelineSettings {
    /// Overall deadline of the primary path (unset = none)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

impl AppConfig {
    /// Planner settings derived from the sentiment and tools sections
    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            escalation_worker: self.sentiment.escalation_worker.clone(),
            code_max_iterations: self.tools.code_max_iterations,
            ..PlannerConfig::default()
        }
    }

    /// Pipeline settings derived from every section that affects a request
    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default()
            .with_redaction_mode(self.pii.redaction_mode)
            .with_pii_cache_ttl(Duration::from_secs(self.cache.pii_ttl_secs))
            .with_sentiment_threshold(self.sentiment.threshold)
            .with_summarizer_model(self.llm.summarizer_model.clone())
            .with_prefetch_ttl(Duration::from_secs(self.cache.prefetch_ttl_secs));
        if self.memory.enabled {
            config = config.with_memory(self.memory.top_k);
        }
        if let Some(secs) = self.pipeline.request_timeout_secs.filter(|s| *s > 0) {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        config
    }
}
