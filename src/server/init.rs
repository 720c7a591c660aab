//! Server initialization and main run loop
//!
//! Contains the main `run()` function that wires the pipeline and serves
//! the HTTP surface until a shutdown signal arrives.

use super::config::{AppConfig, CacheBackend, CacheConfig};
use super::loader::load_config;
use crate::middleware::auth::MasterKey;
use anyhow::{Context, Result};
use axum::{routing::get, Extension, Router};
use cortex_core::{
    CacheStore, InMemoryCache, LocalMemory, RedisCache, RequestPipeline, SharedWorkerRegistry,
    VectorMemory, WorkerRegistry,
};
use cortex_llm::{CompletionService, OpenAiCompatService};
use cortex_tools::{CodeRunner, ToolExecutor};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Grace period for detached jobs at shutdown
const BACKGROUND_GRACE: Duration = Duration::from_secs(5);

fn build_cache(config: &CacheConfig) -> Result<Arc<dyn CacheStore>> {
    match config.backend {
        CacheBackend::Memory => Ok(Arc::new(InMemoryCache::new())),
        CacheBackend::Redis => {
            let cache = RedisCache::new(&config.redis_url).context("Failed to create Redis cache")?;
            Ok(Arc::new(cache))
        }
    }
}

/// Wire every component of the request pipeline from configuration
pub fn build_pipeline(config: &AppConfig) -> Result<Arc<RequestPipeline>> {
    let completion: Arc<dyn CompletionService> = Arc::new(
        OpenAiCompatService::new(config.llm.completion_config())
            .context("Failed to create completion service")?,
    );
    let registry = SharedWorkerRegistry::new(WorkerRegistry::from_configs(config.workers.clone()));
    let runner: Arc<dyn CodeRunner> = Arc::new(ToolExecutor::new(config.tools.executor_config()));
    let cache = build_cache(&config.cache)?;

    let mut builder = RequestPipeline::builder(completion, registry)
        .with_code_runner(runner)
        .with_cache(cache)
        .with_planner(config.planner_config())
        .with_config(config.pipeline_config());
    if config.memory.enabled {
        let memory: Arc<dyn VectorMemory> = Arc::new(LocalMemory::new());
        builder = builder.with_memory(memory);
    }

    Ok(Arc::new(builder.build()))
}

/// Build the main router with all endpoints
pub fn build_router(pipeline: Arc<RequestPipeline>, master_key: Option<String>) -> Router {
    Router::new()
        .merge(crate::api::health_routes())
        .merge(crate::api::metrics_routes())
        .merge(crate::api::chat_routes())
        .merge(crate::api::workers_routes())
        .route("/", get(|| async { "Cortex LLM Orchestrator" }))
        .layer(Extension(pipeline))
        .layer(Extension(MasterKey::new(master_key)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run the server
pub async fn run(config: AppConfig) -> Result<()> {
    info!("Starting Cortex v{}", env!("CARGO_PKG_VERSION"));

    let pipeline = build_pipeline(&config)?;
    let registry = pipeline.registry().load();
    info!(
        workers = registry.len(),
        cache = pipeline.cache().backend(),
        memory = config.memory.enabled,
        "Pipeline initialized"
    );
    if config.server.master_key.is_none() {
        warn!("No master key configured, /v1 endpoints are unauthenticated");
    }

    spawn_worker_reload(pipeline.registry().clone());

    let app = build_router(pipeline.clone(), config.server.master_key.clone());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("HTTP server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Waiting for background jobs to finish...");
    pipeline.background().shutdown(BACKGROUND_GRACE).await;

    info!("Cortex shutdown complete");
    Ok(())
}

/// Reload the worker map from configuration on SIGHUP
#[cfg(unix)]
fn spawn_worker_reload(registry: SharedWorkerRegistry) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(e) => {
            warn!(error = %e, "Failed to install SIGHUP handler, worker reload disabled");
            return;
        }
    };

    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            match load_config() {
                Ok(config) => {
                    registry.replace(WorkerRegistry::from_configs(config.workers));
                    info!(workers = registry.load().len(), "Worker configuration reloaded");
                }
                Err(e) => warn!(error = %e, "Worker reload failed, keeping current workers"),
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_worker_reload(_registry: SharedWorkerRegistry) {}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
