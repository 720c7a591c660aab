//! Predictive prefetcher
//!
//! Detects common multi-step workflows in a prompt and stores a small
//! "ready" payload of likely follow-ups in the cache store. Every failure
//! is swallowed: this path never affects the request that triggered it.


use crate::cache::CacheStore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default prefetch TTL
pub const DEFAULT_PREFETCH_TTL: Duration = Duration::from_secs(600);

/// Workflow name → likely follow-up actions, in detection order
pub const WORKFLOW_PATTERNS: &[(&str, &[&str])] = &[
    ("plan_trip", &["generate itinerary", "suggest hotels", "find flights"]),
    ("book_meeting", &["draft meeting summary", "create agenda", "send invites"]),
    ("draft_email", &["suggest subject lines", "format signature", "add greeting"]),
    ("write_code", &["add tests", "add documentation", "review code"]),
    ("debug_code", &["suggest fixes", "explain error", "find similar issues"]),
];

/// Prefetch context; ordered so the cache key is stable
pub type PrefetchContext = BTreeMap<String, String>;

/// Stored payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchPayload {
    /// Workflow name
    pub workflow: String,
    /// Likely follow-up actions
    pub follow_ups: Vec<String>,
    /// Context the payload was computed for
    pub context: PrefetchContext,
    /// Always `ready`
    pub status: String,
}

/// What a prefetch call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefetchOutcome {
    /// Payload computed and stored
    Stored,
    /// A payload already existed; nothing computed
    AlreadyCached,
    /// The workflow is not in the table
    UnknownWorkflow,
    /// The cache failed; logged and ignored
    Failed,
}

fn follow_ups(workflow: &str) -> Option<&'static [&'static str]> {
    WORKFLOW_PATTERNS
        .iter()
        .find(|(name, _)| *name == workflow)
        .map(|(_, follow_ups)| *follow_ups)
}

/// First workflow whose spaced name occurs in `prompt`
#[must_use]
pub fn detect_workflow(prompt: &str) -> Option<&'static str> {
    if prompt.is_empty() {
        return None;
    }
    let lower = prompt.to_lowercase();
    let found = WORKFLOW_PATTERNS
        .iter()
        .map(|(name, _)| *name)
        .find(|name| lower.contains(&name.replace('_', " ")));
    if let Some(workflow) = found {
        info!(workflow, prompt_length = prompt.len(), "Workflow detected");
    }
    found
}

/// `prefetch:{user}:{workflow}:{hash}` where the hash covers the sorted context
#[must_use]
pub fn cache_key(user_id: &str, workflow: &str, context: &PrefetchContext) -> String {
    let mut hasher = Sha256::new();
    for (key, value) in context {
        hasher.update(key.as_bytes());
        hasher.update([0u8]);
        hasher.update(value.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    let short: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
    format!("prefetch:{user_id}:{workflow}:{short}")
}

/// Predictive prefetcher over a cache store
#[derive(Clone)]
pub struct Prefetcher {
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl Prefetcher {
    /// Create a prefetcher with the default TTL
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self {
            cache,
            ttl: DEFAULT_PREFETCH_TTL,
        }
    }

    /// Set the payload TTL
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Compute and store the payload for `workflow` unless already cached
    pub async fn prefetch(
        &self,
        workflow: &str,
        context: &PrefetchContext,
        user_id: &str,
    ) -> PrefetchOutcome {
        let Some(actions) = follow_ups(workflow) else {
            warn!(workflow = %workflow, "Unknown workflow, prefetch skipped");
            return PrefetchOutcome::UnknownWorkflow;
        };
        let key = cache_key(user_id, workflow, context);

        match self.cache.get(&key).await {
            Ok(Some(_)) => {
                debug!(cache_key = %key, "Prefetch already cached");
                return PrefetchOutcome::AlreadyCached;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(workflow = %workflow, error = %e, "Prefetch failed");
                return PrefetchOutcome::Failed;
            }
        }

        let payload = PrefetchPayload {
            workflow: workflow.to_string(),
            follow_ups: actions.iter().map(|s| s.to_string()).collect(),
            context: context.clone(),
            status: "ready".to_string(),
        };
        let stored = match serde_json::to_string(&payload) {
            Ok(raw) => self.cache.set(&key, &raw, Some(self.ttl)).await,
            Err(e) => Err(e.into()),
        };

        match stored {
            Ok(()) => {
                info!(
                    workflow = %workflow,
                    cache_key = %key,
                    follow_up_count = actions.len(),
                    "Prefetch completed"
                );
                PrefetchOutcome::Stored
            }
            Err(e) => {
                warn!(workflow = %workflow, error = %e, "Prefetch failed");
                PrefetchOutcome::Failed
            }
        }
    }

    /// Cached payload, if any; cache errors read as a miss
    pub async fn get_cached_result(
        &self,
        user_id: &str,
        workflow: &str,
        context: &PrefetchContext,
    ) -> Option<PrefetchPayload> {
        let key = cache_key(user_id, workflow, context);
        let raw = match self.cache.get(&key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(cache_key = %key, error = %e, "Prefetch lookup failed");
                return None;
            }
        };
        match raw.and_then(|raw| serde_json::from_str(&raw).ok()) {
            Some(payload) => {
                info!(cache_key = %key, "Prefetch cache hit");
                Some(payload)
            }
            None => {
                debug!(cache_key = %key, "Prefetch cache miss");
                None
            }
        }
    }
}

impl std::fmt::Debug for Prefetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prefetcher")
            .field("backend", &self.cache.backend())
            .field("ttl", &self.ttl)
            .finish()
    }
}
