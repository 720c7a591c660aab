//! Prometheus metrics endpoint

use axum::extract::Extension;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use cortex_core::RequestPipeline;
use std::sync::Arc;

async fn metrics(Extension(pipeline): Extension<Arc<RequestPipeline>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        pipeline.metrics().registry().export_prometheus(),
    )
}

/// Create metrics routes
pub fn metrics_routes() -> Router {
    Router::new().route("/metrics", get(metrics))
}
