//! Detached background jobs
//!
//! Memory write-back and prefetch run here, never on the request path.
//! Each job has its own error boundary: failures are logged and counted,
//! and never reach the request that submitted them.

use crate::error::Result;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct JobStats {
    submitted: AtomicU64,
    failed: AtomicU64,
}

/// Supervised queue of detached jobs
#[derive(Debug, Clone, Default)]
pub struct BackgroundTasks {
    tracker: TaskTracker,
    cancel: CancellationToken,
    stats: Arc<JobStats>,
}

impl BackgroundTasks {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit a job; returns immediately
    ///
    /// Jobs submitted after [`shutdown`](Self::shutdown) are dropped.
    pub fn submit<F>(&self, name: &'static str, job: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        if self.cancel.is_cancelled() {
            debug!(job = name, "Background queue closed, job dropped");
            return;
        }
        self.stats.submitted.fetch_add(1, Ordering::Relaxed);

        let cancel = self.cancel.clone();
        let stats = self.stats.clone();
        self.tracker.spawn(async move {
            tokio::select! {
                result = job => {
                    if let Err(e) = result {
                        stats.failed.fetch_add(1, Ordering::Relaxed);
                        warn!(job = name, error = %e, "Background job failed");
                    } else {
                        debug!(job = name, "Background job finished");
                    }
                }
                () = cancel.cancelled() => {
                    debug!(job = name, "Background job cancelled");
                }
            }
        });
    }

    /// Jobs currently running
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Jobs submitted since start
    #[must_use]
    pub fn submitted(&self) -> u64 {
        self.stats.submitted.load(Ordering::Relaxed)
    }

    /// Jobs that returned an error
    #[must_use]
    pub fn failed(&self) -> u64 {
        self.stats.failed.load(Ordering::Relaxed)
    }

    /// Wait until no job is running
    pub async fn wait_idle(&self) {
        while !self.tracker.is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Stop accepting jobs, drain for up to `grace`, then cancel the rest
    pub async fn shutdown(&self, grace: Duration) {
        self.tracker.close();
        if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
            warn!(
                remaining = self.tracker.len(),
                "Background jobs still running after grace period, cancelling"
            );
        }
        self.cancel.cancel();
        self.tracker.wait().await;
        info!(
            submitted = self.submitted(),
            failed = self.failed(),
            "Background queue stopped"
        );
    }
}
