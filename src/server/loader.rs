//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let config = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. External overrides (optional)
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            File::with_name(&format!(
                "config/{}",
                std::env::var("CORTEX_ENV").unwrap_or_else(|_| "development".to_string())
            ))
            .required(false),
        )
        .add_source(File::with_name("config/local").required(false))
        // 3. Environment variables (highest priority)
        // prefix_separator("_") makes CORTEX_LLM__API_KEY map to llm.api_key
        .add_source(
            Environment::with_prefix("CORTEX")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::config::{CacheBackend, LogFormat};

    fn embedded() -> AppConfig {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_embedded_defaults_parse() {
        let config = embedded();
        assert_eq!(config.server.port, 8080);
        assert!(config.server.master_key.is_none());
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.pii_ttl_secs, 300);
        assert_eq!(config.cache.prefetch_ttl_secs, 600);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!((config.sentiment.threshold + 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_embedded_workers() {
        let config = embedded();
        let mut names: Vec<&str> = config.workers.keys().map(String::as_str).collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec![
                "orchestrator",
                "worker_logic",
                "worker_math",
                "worker_vision_fast",
                "worker_vision_pro"
            ]
        );
        assert!(config.workers["worker_vision_pro"].supports_vision);
    }

    #[test]
    fn test_pipeline_config_mapping() {
        let mut config = embedded();
        config.memory.enabled = true;
        config.memory.top_k = 5;
        config.pipeline.request_timeout_secs = Some(20);

        let pipeline = config.pipeline_config();
        assert!(pipeline.memory_enabled);
        assert_eq!(pipeline.memory_top_k, 5);
        assert_eq!(
            pipeline.request_timeout,
            Some(std::time::Duration::from_secs(20))
        );
        assert_eq!(config.planner_config().escalation_worker, "worker_logic");
    }
}
