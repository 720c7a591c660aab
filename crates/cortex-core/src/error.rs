//! Error types for cortex-core

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// The completion service failed on behalf of a worker
    #[error("worker {worker} call failed: {source}")]
    WorkerCallFailed {
        /// Worker name
        worker: String,
        /// Underlying completion error
        #[source]
        source: cortex_llm::Error,
    },

    /// Neither the requested worker nor the generalist fallback exists
    #[error("worker not found: {0}")]
    WorkerNotFound(String),

    /// Both vision tiers failed
    #[error("vision escalation exhausted: {primary}; fallback: {fallback}")]
    VisionEscalationExhausted {
        /// Error from the first worker tried
        primary: String,
        /// Error from the downgrade worker
        fallback: String,
    },

    /// The request deadline elapsed
    #[error("deadline of {0}ms exceeded")]
    DeadlineExceeded(u64),

    /// Cache store error
    #[error("cache error: {0}")]
    Cache(String),

    /// Vector memory error
    #[error("memory error: {0}")]
    Memory(String),

    /// Failure in a non-critical path (PII cache, prefetch, write-back)
    #[error("safety net failure: {0}")]
    SafetyNet(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Completion service error outside a worker call
    #[error("llm error: {0}")]
    Llm(#[from] cortex_llm::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
