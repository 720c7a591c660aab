//! Pipeline event bus
//!
//! Broadcast channel for routing decisions and safety-net activations.
//! Events carry identifiers and decisions only, never message content.

use serde::Serialize;
use tokio::sync::broadcast;

/// Events emitted while a request moves through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// Request accepted
    RequestStarted {
        /// Request identifier
        request_id: String,
        /// Requested model (`auto` for routed requests)
        model: String,
    },
    /// Classifier and planner decided
    TaskClassified {
        /// Request identifier
        request_id: String,
        /// Category wire name
        category: String,
        /// Worker chosen by the plan
        worker: String,
        /// Strategy wire name
        strategy: String,
    },
    /// Negative sentiment forced the escalation worker
    SentimentOverride {
        /// Request identifier
        request_id: String,
        /// Worker the plan would have used
        original_worker: String,
        /// Worker used instead
        override_worker: String,
        /// Compound score that tripped the breaker
        score: f64,
    },
    /// The high-quality vision worker failed and the fast tier was tried
    VisionDowngrade {
        /// Request identifier
        request_id: String,
        /// Failed worker
        from_worker: String,
        /// Retry worker
        to_worker: String,
    },
    /// The generalist fallback (or static response) was used
    FallbackUsed {
        /// Request identifier
        request_id: String,
        /// Why the primary path failed
        reason: String,
        /// Whether the static response was returned
        static_response: bool,
    },
    /// Request finished
    RequestCompleted {
        /// Request identifier
        request_id: String,
        /// Wall-clock latency
        latency_ms: u64,
    },
}

impl PipelineEvent {
    /// Request the event belongs to
    #[must_use]
    pub fn request_id(&self) -> &str {
        match self {
            Self::RequestStarted { request_id, .. }
            | Self::TaskClassified { request_id, .. }
            | Self::SentimentOverride { request_id, .. }
            | Self::VisionDowngrade { request_id, .. }
            | Self::FallbackUsed { request_id, .. }
            | Self::RequestCompleted { request_id, .. } => request_id,
        }
    }
}

/// Broadcast-based event bus
///
/// Slow subscribers lag and miss events rather than blocking requests.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
    /// Create a bus with the given channel capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to future events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.sender.subscribe()
    }

    /// Publish an event; returns the number of receivers
    pub fn publish(&self, event: PipelineEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Number of active subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
