//! Sentiment circuit breaker
//!
//! Scores the affect of a message and decides whether routing must be
//! forced to the most capable worker. Scoring sits behind
//! [`SentimentScorer`]; [`VaderScorer`] is the default implementation.

mod vader;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use tracing::debug;

pub use vader::VaderScorer;

/// Default override threshold
pub const DEFAULT_THRESHOLD: f64 = -0.8;

/// Compound sentiment scorer
pub trait SentimentScorer: Send + Sync {
    /// Compound score in −1.0..=1.0
    fn compound(&self, text: &str) -> f64;
}

/// Threshold-based sentiment override
#[derive(Clone)]
pub struct SentimentBreaker {
    scorer: Arc<dyn SentimentScorer>,
    threshold: f64,
}

impl std::fmt::Debug for SentimentBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentBreaker")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl Default for SentimentBreaker {
    fn default() -> Self {
        Self::new(Arc::new(VaderScorer), DEFAULT_THRESHOLD)
    }
}

impl SentimentBreaker {
    /// Create a breaker with a custom scorer
    #[must_use]
    pub fn new(scorer: Arc<dyn SentimentScorer>, threshold: f64) -> Self {
        Self { scorer, threshold }
    }

    /// Built-in scorer with the given threshold
    #[must_use]
    pub fn with_threshold(threshold: f64) -> Self {
        Self::new(Arc::new(VaderScorer), threshold)
    }

    /// Configured threshold
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score `text`; empty text scores 0.0
    #[must_use]
    pub fn analyze(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }
        let score = self.scorer.compound(text).clamp(-1.0, 1.0);
        debug!(score, "Sentiment analyzed");
        score
    }

    /// Whether `score` is at or below the threshold
    #[must_use]
    pub fn should_override(&self, score: f64) -> bool {
        score <= self.threshold
    }
}
