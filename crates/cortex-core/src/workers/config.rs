//! Persisted worker configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_max_tokens() -> u32 {
    2000
}

fn default_temperature() -> f32 {
    0.7
}

/// Configuration of one worker (`workers.<name>` in the config file)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Model identifier passed to the completion service
    pub model: String,
    /// Upstream provider label, informational only
    #[serde(default)]
    pub provider: Option<String>,
    /// Short role description, used in the derived system prompt
    pub role: String,
    /// Generation limit
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Whether the worker can drive tools
    #[serde(default)]
    pub supports_tools: bool,
    /// Whether the worker accepts image input
    #[serde(default)]
    pub supports_vision: bool,
    /// Free-form description
    #[serde(default)]
    pub description: String,
}

/// Workers used when configuration defines none
#[must_use]
pub fn fallback_workers() -> HashMap<String, WorkerConfig> {
    HashMap::from([
        (
            "orchestrator".to_string(),
            WorkerConfig {
                model: "llama-3.1-8b-instant".to_string(),
                provider: Some("groq".to_string()),
                role: "Task orchestration".to_string(),
                max_tokens: 1000,
                temperature: 0.3,
                supports_tools: false,
                supports_vision: false,
                description: "Fast generalist for chat and routing".to_string(),
            },
        ),
        (
            "worker_logic".to_string(),
            WorkerConfig {
                model: "llama-3.1-70b-versatile".to_string(),
                provider: Some("groq".to_string()),
                role: "Code generation and reasoning".to_string(),
                max_tokens: 4000,
                temperature: 0.1,
                supports_tools: true,
                supports_vision: false,
                description: "Code generation and multi-step reasoning".to_string(),
            },
        ),
    ])
}
