//! Health check endpoints
//!
//! Provides:
//! - `/health`: liveness (for load balancers)
//! - `/health/ready`: readiness with a cache store ping

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use cortex_core::RequestPipeline;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Simple health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Readiness response
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub checks: ReadyChecks,
}

/// Component checks
#[derive(Debug, Serialize)]
pub struct ReadyChecks {
    pub cache: ComponentHealth,
    pub workers: usize,
    pub background_jobs: usize,
}

/// Individual component health status
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: &'static str,
    pub backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "cortex",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn ready_check(
    Extension(pipeline): Extension<Arc<RequestPipeline>>,
) -> (StatusCode, Json<ReadyResponse>) {
    let cache = pipeline.cache();
    let start = Instant::now();
    let cache_health = match cache.ping().await {
        Ok(()) => ComponentHealth {
            status: "healthy",
            backend: cache.backend(),
            latency_ms: Some(start.elapsed().as_millis() as u64),
            error: None,
        },
        Err(e) => ComponentHealth {
            status: "unhealthy",
            backend: cache.backend(),
            latency_ms: None,
            error: Some(e.to_string()),
        },
    };

    let ready = cache_health.error.is_none();
    let body = ReadyResponse {
        status: if ready { "ready" } else { "degraded" },
        checks: ReadyChecks {
            cache: cache_health,
            workers: pipeline.registry().load().len(),
            background_jobs: pipeline.background().in_flight(),
        },
    };
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

/// Create health routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(ready_check))
}
