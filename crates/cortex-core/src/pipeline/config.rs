//! Pipeline configuration

use crate::pii::RedactionMode;
use crate::prefetch::DEFAULT_PREFETCH_TTL;
use crate::sentiment::DEFAULT_THRESHOLD;
use std::time::Duration;

/// Default TTL of cached PII mappings
pub const DEFAULT_PII_TTL: Duration = Duration::from_secs(300);

/// Default number of memory summaries injected
pub const DEFAULT_MEMORY_TOP_K: usize = 3;

/// Request pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Handling of repeated PII values
    pub redaction_mode: RedactionMode,
    /// TTL of the `pii:{request_id}` cache entry
    pub pii_cache_ttl: Duration,
    /// Sentiment override threshold
    pub sentiment_threshold: f64,
    /// Retrieve and write back memory
    pub memory_enabled: bool,
    /// Summaries retrieved per request
    pub memory_top_k: usize,
    /// Model used to summarise exchanges for memory
    pub summarizer_model: String,
    /// TTL of prefetch payloads
    pub prefetch_ttl: Duration,
    /// Overall deadline for the primary path
    pub request_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            redaction_mode: RedactionMode::default(),
            pii_cache_ttl: DEFAULT_PII_TTL,
            sentiment_threshold: DEFAULT_THRESHOLD,
            memory_enabled: false,
            memory_top_k: DEFAULT_MEMORY_TOP_K,
            summarizer_model: "llama-3.1-8b-instant".to_string(),
            prefetch_ttl: DEFAULT_PREFETCH_TTL,
            request_timeout: None,
        }
    }
}

impl PipelineConfig {
    /// Set the redaction mode
    #[must_use]
    pub fn with_redaction_mode(mut self, mode: RedactionMode) -> Self {
        self.redaction_mode = mode;
        self
    }

    /// Set the PII mapping TTL
    #[must_use]
    pub fn with_pii_cache_ttl(mut self, ttl: Duration) -> Self {
        self.pii_cache_ttl = ttl;
        self
    }

    /// Set the sentiment threshold
    #[must_use]
    pub fn with_sentiment_threshold(mut self, threshold: f64) -> Self {
        self.sentiment_threshold = threshold;
        self
    }

    /// Enable memory with `top_k` retrieved summaries
    #[must_use]
    pub fn with_memory(mut self, top_k: usize) -> Self {
        self.memory_enabled = true;
        self.memory_top_k = top_k;
        self
    }

    /// Set the summariser model
    #[must_use]
    pub fn with_summarizer_model(mut self, model: impl Into<String>) -> Self {
        self.summarizer_model = model.into();
        self
    }

    /// Set the prefetch TTL
    #[must_use]
    pub fn with_prefetch_ttl(mut self, ttl: Duration) -> Self {
        self.prefetch_ttl = ttl;
        self
    }

    /// Set the overall deadline
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}
