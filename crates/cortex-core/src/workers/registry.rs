//! Worker registry
//!
//! Built once from configuration and read-only afterwards. Reloads publish
//! a whole new registry through [`SharedWorkerRegistry`]; readers keep the
//! snapshot they started with.

use super::config::{fallback_workers, WorkerConfig};
use super::prompts::system_prompt;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// A resolved worker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Worker {
    /// Logical name
    pub name: String,
    /// Model identifier
    pub model: String,
    /// Role description
    pub role: String,
    /// Generation limit
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Tool capable
    pub supports_tools: bool,
    /// Vision capable
    pub supports_vision: bool,
    /// Free-form description
    pub description: String,
    /// System prompt prepended to every call
    #[serde(skip)]
    pub system_prompt: String,
}

impl Worker {
    fn from_config(name: &str, config: WorkerConfig) -> Self {
        Self {
            system_prompt: system_prompt(name, &config.role),
            name: name.to_string(),
            model: config.model,
            role: config.role,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            supports_tools: config.supports_tools,
            supports_vision: config.supports_vision,
            description: config.description,
        }
    }
}

/// Immutable name → worker table
#[derive(Debug, Clone, Default)]
pub struct WorkerRegistry {
    workers: HashMap<String, Worker>,
}

impl WorkerRegistry {
    /// Build from configuration, using the built-in pair when it is empty
    #[must_use]
    pub fn from_configs(configs: HashMap<String, WorkerConfig>) -> Self {
        let configs = if configs.is_empty() {
            warn!("No workers configured, using built-in fallback workers");
            fallback_workers()
        } else {
            configs
        };

        let workers = configs
            .into_iter()
            .map(|(name, config)| {
                let worker = Worker::from_config(&name, config);
                (name, worker)
            })
            .collect::<HashMap<_, _>>();

        info!(count = workers.len(), "Worker registry built");
        Self { workers }
    }

    /// Look up a worker
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Worker> {
        self.workers.get(name)
    }

    /// Whether a worker exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.workers.contains_key(name)
    }

    /// Worker names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.workers.keys().cloned().collect();
        names.sort();
        names
    }

    /// All workers, sorted by name
    #[must_use]
    pub fn workers(&self) -> Vec<&Worker> {
        let mut workers: Vec<&Worker> = self.workers.values().collect();
        workers.sort_by(|a, b| a.name.cmp(&b.name));
        workers
    }

    /// Number of workers
    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

/// Registry handle that supports atomic replacement
#[derive(Debug, Clone)]
pub struct SharedWorkerRegistry {
    inner: Arc<RwLock<Arc<WorkerRegistry>>>,
}

impl SharedWorkerRegistry {
    /// Wrap a registry
    #[must_use]
    pub fn new(registry: WorkerRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    /// Current snapshot
    #[must_use]
    pub fn load(&self) -> Arc<WorkerRegistry> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Publish a new registry; in-flight readers keep their snapshot
    pub fn replace(&self, registry: WorkerRegistry) {
        let count = registry.len();
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(registry);
        info!(count, "Worker registry replaced");
    }
}

impl Default for SharedWorkerRegistry {
    fn default() -> Self {
        Self::new(WorkerRegistry::from_configs(HashMap::new()))
    }
}
