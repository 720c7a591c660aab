//! HTTP surface tests

use crate::server::build_router;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use cortex_core::{RequestPipeline, SharedWorkerRegistry, WorkerConfig, WorkerRegistry};
use cortex_llm::MockCompletionService;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

fn worker(model: &str, role: &str) -> WorkerConfig {
    WorkerConfig {
        model: model.to_string(),
        provider: None,
        role: role.to_string(),
        max_tokens: 100,
        temperature: 0.2,
        supports_tools: false,
        supports_vision: false,
        description: String::new(),
    }
}

fn app(mock: Arc<MockCompletionService>, master_key: Option<&str>) -> Router {
    let registry = SharedWorkerRegistry::new(WorkerRegistry::from_configs(HashMap::from([
        ("orchestrator".to_string(), worker("model-orchestrator", "Task orchestration")),
        ("worker_logic".to_string(), worker("model-logic", "Code generation")),
    ])));
    let pipeline = Arc::new(RequestPipeline::builder(mock, registry).build());
    build_router(pipeline, master_key.map(str::to_string))
}

fn chat(body: Value) -> Request<Body> {
    Request::post("/v1/chat/completions")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app(Arc::new(MockCompletionService::new()), None)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "cortex");
}

#[tokio::test]
async fn test_ready_pings_cache() {
    let response = app(Arc::new(MockCompletionService::new()), None)
        .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["cache"]["backend"], "memory");
    assert_eq!(body["checks"]["workers"], 2);
}

#[tokio::test]
async fn test_chat_completion_auto() {
    let mock = Arc::new(MockCompletionService::new());
    mock.push_reply("Hi there!");

    let response = app(mock.clone(), None)
        .oneshot(chat(json!({
            "messages": [{"role": "user", "content": "Hello, how are you?"}]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-cortex-task-type"], "simple_chat");
    assert!(response.headers().contains_key("x-cortex-request-id"));
    let body = json_body(response).await;
    assert_eq!(body["choices"][0]["message"]["content"], "Hi there!");
    assert_eq!(body["usage"]["total_tokens"], 15);
    assert_eq!(mock.requested_models(), vec!["model-orchestrator"]);
}

#[tokio::test]
async fn test_chat_completion_literal_model() {
    let mock = Arc::new(MockCompletionService::new());

    let response = app(mock.clone(), None)
        .oneshot(chat(json!({
            "model": "gpt-4o-mini",
            "messages": [{"role": "user", "content": "hi"}],
            "user": "dana"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key("x-cortex-task-type"));
    let requests = mock.requests();
    assert_eq!(requests[0].model, "gpt-4o-mini");
    assert_eq!(requests[0].user.as_deref(), Some("dana"));
}

#[tokio::test]
async fn test_chat_validation_errors() {
    let cases = [
        json!({"messages": []}),
        json!({"messages": [{"role": "user", "content": "hi"}], "temperature": 2.5}),
        json!({"messages": [{"role": "user", "content": "hi"}], "max_tokens": 0}),
        json!({"messages": [{"role": "user", "content": "hi"}], "stream": true}),
        json!({"model": "auto"}),
    ];

    for case in cases {
        let mock = Arc::new(MockCompletionService::new());
        let response = app(mock.clone(), None).oneshot(chat(case.clone())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{case}");
        let body = json_body(response).await;
        assert_eq!(body["error"]["type"], "invalid_request_error");
        assert_eq!(mock.call_count(), 0);
    }
}

#[tokio::test]
async fn test_master_key_required_on_v1() {
    let mock = Arc::new(MockCompletionService::new());
    let router = app(mock.clone(), Some("sk-master"));

    let response = router
        .clone()
        .oneshot(chat(json!({"messages": [{"role": "user", "content": "hi"}]})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"]["code"], "invalid_api_key");

    let mut request = chat(json!({"messages": [{"role": "user", "content": "hi"}]}));
    request
        .headers_mut()
        .insert("authorization", "Bearer sk-master".parse().unwrap());
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_worker_listing() {
    let router = app(Arc::new(MockCompletionService::new()), None);

    let response = router
        .clone()
        .oneshot(Request::get("/v1/workers").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["object"], "list");
    assert_eq!(body["data"][0]["name"], "orchestrator");
    assert_eq!(body["data"][1]["model"], "model-logic");

    let response = router
        .clone()
        .oneshot(Request::get("/v1/workers/worker_logic").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["role"], "Code generation");

    let response = router
        .oneshot(Request::get("/v1/workers/ghost").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_export() {
    let mock = Arc::new(MockCompletionService::new());
    let router = app(mock, None);

    router
        .clone()
        .oneshot(chat(json!({"messages": [{"role": "user", "content": "hello"}]})))
        .await
        .unwrap();

    let response = router
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("cortex_requests_total{category=\"simple_chat\"} 1"));
}
