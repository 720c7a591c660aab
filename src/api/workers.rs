//! Worker listing
//!
//! Read-only view of the current worker registry snapshot.

use super::error::ApiError;
use crate::middleware::auth::RequireMasterKey;
use axum::extract::{Extension, Path};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use cortex_core::{RequestPipeline, Worker};
use serde::Serialize;
use std::sync::Arc;

/// Worker list response
#[derive(Debug, Serialize)]
pub struct WorkerList {
    pub object: &'static str,
    pub data: Vec<Worker>,
}

async fn list_workers(
    _auth: RequireMasterKey,
    Extension(pipeline): Extension<Arc<RequestPipeline>>,
) -> Json<WorkerList> {
    let registry = pipeline.registry().load();
    Json(WorkerList {
        object: "list",
        data: registry.workers().into_iter().cloned().collect(),
    })
}

async fn worker_info(
    _auth: RequireMasterKey,
    Extension(pipeline): Extension<Arc<RequestPipeline>>,
    Path(name): Path<String>,
) -> Result<Json<Worker>, ApiError> {
    pipeline
        .registry()
        .load()
        .get(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("worker '{name}' not found")))
}

/// Create worker routes
pub fn workers_routes() -> Router {
    Router::new()
        .route("/v1/workers", get(list_workers))
        .route("/v1/workers/:name", get(worker_info))
}
