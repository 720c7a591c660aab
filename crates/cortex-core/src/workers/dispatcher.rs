//! Worker dispatcher
//!
//! Turns "call worker X with these messages" into a completion request:
//! prepends the worker's system prompt and applies its model parameters.

use super::registry::{SharedWorkerRegistry, Worker};
use crate::error::{Error, Result};
use cortex_llm::{ChatCompletion, CompletionRequest, CompletionService, Message};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Calls workers through a completion service
#[derive(Clone)]
pub struct WorkerDispatcher {
    registry: SharedWorkerRegistry,
    completion: Arc<dyn CompletionService>,
    generalist: String,
}

impl WorkerDispatcher {
    /// Create a dispatcher; unknown workers fall back to `generalist`
    pub fn new(
        registry: SharedWorkerRegistry,
        completion: Arc<dyn CompletionService>,
        generalist: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            completion,
            generalist: generalist.into(),
        }
    }

    /// Registry handle
    #[must_use]
    pub fn registry(&self) -> &SharedWorkerRegistry {
        &self.registry
    }

    /// Completion service
    #[must_use]
    pub fn completion(&self) -> &Arc<dyn CompletionService> {
        &self.completion
    }

    /// Generalist worker name
    #[must_use]
    pub fn generalist(&self) -> &str {
        &self.generalist
    }

    fn resolve(&self, name: &str) -> Result<Worker> {
        let registry = self.registry.load();
        if let Some(worker) = registry.get(name) {
            return Ok(worker.clone());
        }
        warn!(
            worker = %name,
            fallback = %self.generalist,
            "Unknown worker, falling back to generalist"
        );
        registry
            .get(&self.generalist)
            .cloned()
            .ok_or_else(|| Error::WorkerNotFound(name.to_string()))
    }

    /// Call a worker
    #[instrument(skip(self, messages), fields(message_count = messages.len()))]
    pub async fn call_worker(
        &self,
        name: &str,
        messages: &[Message],
        request_id: &str,
    ) -> Result<ChatCompletion> {
        let worker = self.resolve(name)?;

        let mut prompt = Vec::with_capacity(messages.len() + 1);
        prompt.push(Message::system(worker.system_prompt.clone()));
        prompt.extend_from_slice(messages);

        let request = CompletionRequest::new(worker.model.clone(), prompt)
            .with_max_tokens(worker.max_tokens)
            .with_temperature(worker.temperature);

        debug!(worker = %worker.name, model = %worker.model, "Calling worker");
        self.completion
            .complete(request)
            .await
            .map_err(|source| Error::WorkerCallFailed {
                worker: worker.name.clone(),
                source,
            })
    }

    /// Call a literal model without any worker decoration
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn call_model(&self, request: CompletionRequest) -> Result<ChatCompletion> {
        Ok(self.completion.complete(request).await?)
    }
}

impl std::fmt::Debug for WorkerDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerDispatcher")
            .field("service", &self.completion.name())
            .field("generalist", &self.generalist)
            .finish()
    }
}
