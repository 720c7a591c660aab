//! Web API module for Cortex
//!
//! Provides REST API endpoints for:
//! - OpenAI-compatible chat completions
//! - Health and readiness
//! - Prometheus metrics
//! - Worker listing

pub mod chat;
pub mod error;
pub mod health;
pub mod metrics;
pub mod workers;

#[cfg(test)]
mod tests;

pub use chat::chat_routes;
pub use health::health_routes;
pub use metrics::metrics_routes;
pub use workers::workers_routes;
