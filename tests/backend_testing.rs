//! End-to-end tests against mock backends over real sockets.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use backend_harness::client::{FailureKind, HttpRequest, RequestOutcome, ReqwestTransport};
use backend_harness::config::{HarnessConfig, TargetConfig};
use backend_harness::operations::{ErrorKind, OperationParams, PathStyle, RouteTable};
use backend_harness::{
    BackendOperationRunner, BackendTarget, Harness, HarnessServer, HealthMonitor, HealthState, Operation,
};
use common::{client, closed_addr, eventually, start_programmable_backend, start_silent_backend};

fn target(name: &str, base_url: String, style: PathStyle) -> BackendTarget {
    BackendTarget::new(name, base_url, RouteTable::for_style(style))
}

#[tokio::test]
async fn test_timed_client_returns_any_status() {
    let backend = start_programmable_backend(|_| (503, r#"{"status":"starting"}"#.to_string())).await;

    let outcome = client()
        .send(HttpRequest::get(format!("{}/health", backend.base_url())), 2_000)
        .await;
    match outcome {
        RequestOutcome::Success(response) => {
            assert_eq!(response.status, 503);
            assert_eq!(response.status_line(), "503 Service Unavailable");
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_timed_client_times_out_against_silent_backend() {
    let addr = start_silent_backend().await;

    let outcome = client()
        .send(HttpRequest::get(format!("http://{}/health", addr)), 200)
        .await;
    match outcome {
        RequestOutcome::Failure(failure) => {
            assert_eq!(failure.kind, FailureKind::Timeout);
            assert_eq!(failure.detail, "Request timeout after 0.2 seconds");
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connection_refused_is_network_failure() {
    let addr = closed_addr().await;
    let runner = BackendOperationRunner::new(client()).with_timeout_ms(2_000);

    let result = runner
        .run(
            &target("python", format!("http://{}", addr), PathStyle::Api),
            Operation::Health,
            &OperationParams::default(),
        )
        .await;
    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::Network));
    assert!(result.error_message.is_some());
}

#[tokio::test]
async fn test_create_user_sends_wrapped_body() {
    let backend = start_programmable_backend(|req| {
        let sent: Value = serde_json::from_str(&req.body).unwrap_or(Value::Null);
        (201, json!({ "id": "1", "name": sent["data"]["name"] }).to_string())
    })
    .await;
    let runner = BackendOperationRunner::new(client());
    let python = target("python", backend.base_url(), PathStyle::Api);

    let result = runner
        .run(&python, Operation::Create, &OperationParams::with_id("u1").data(r#"{"name":"Ann"}"#))
        .await;

    assert!(result.success);
    assert_eq!(result.operation_name, "Create User");
    assert_eq!(result.payload, Some(json!({ "id": "1", "name": "Ann" })));

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/api/users/u1");
    assert_eq!(
        serde_json::from_str::<Value>(&requests[0].body).unwrap(),
        json!({ "data": { "name": "Ann" } })
    );
}

#[tokio::test]
async fn test_invalid_json_never_reaches_backend() {
    let backend = start_programmable_backend(|_| (200, "{}".to_string())).await;
    let runner = BackendOperationRunner::new(client());
    let python = target("python", backend.base_url(), PathStyle::Api);

    let result = runner
        .run(&python, Operation::Update, &OperationParams::with_id("1").data("{name:"))
        .await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::Validation));
    assert!(result.error_message.unwrap().starts_with("Invalid JSON data"));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_delete_with_empty_body_has_null_payload() {
    let backend = start_programmable_backend(|_| (204, String::new())).await;
    let runner = BackendOperationRunner::new(client());
    let node = target("node", backend.base_url(), PathStyle::Bare);

    let result = runner.run(&node, Operation::Delete, &OperationParams::with_id("42")).await;

    assert!(result.success);
    assert_eq!(result.payload, None);
    let requests = backend.requests();
    assert_eq!(requests[0].method, "DELETE");
    assert_eq!(requests[0].path, "/users/42");
}

#[tokio::test]
async fn test_server_error_is_http_failure() {
    let backend = start_programmable_backend(|_| (500, r#"{"detail":"boom"}"#.to_string())).await;
    let runner = BackendOperationRunner::new(client());
    let python = target("python", backend.base_url(), PathStyle::Api);

    let result = runner.run(&python, Operation::Get, &OperationParams::with_id("7")).await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::Http));
    assert_eq!(
        result.error_message.as_deref(),
        Some(r#"HTTP 500 Internal Server Error: {"detail":"boom"}"#)
    );
    assert_eq!(backend.requests()[0].path, "/api/users/7");
}

#[tokio::test]
async fn test_monitor_tracks_backend_going_down() {
    let up = Arc::new(AtomicBool::new(true));
    let flag = up.clone();
    let backend = start_programmable_backend(move |_| {
        if flag.load(Ordering::SeqCst) {
            (200, r#"{"status":"ok"}"#.to_string())
        } else {
            (200, "not json".to_string())
        }
    })
    .await;

    let mut settings = HarnessConfig::default().health_check;
    settings.timeout_ms = 1_000;
    let monitor = HealthMonitor::new(client(), &settings);
    monitor.start(
        vec![target("python", backend.base_url(), PathStyle::Api)],
        Duration::from_millis(50),
    );

    assert!(eventually(Duration::from_secs(3), || monitor.current_state("python") == HealthState::Online).await);
    up.store(false, Ordering::SeqCst);
    assert!(eventually(Duration::from_secs(3), || monitor.current_state("python") == HealthState::Offline).await);

    monitor.stop();
    let seen = backend.requests().len();
    up.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(monitor.current_state("python"), HealthState::Offline);
    // At most one probe may have been accepted before cancellation landed.
    assert!(backend.requests().len() <= seen + 1);
}

async fn spawn_control_api(backend_url: String, dir: &tempfile::TempDir) -> String {
    let mut config = HarnessConfig::default();
    config.targets = vec![TargetConfig {
        name: "mock".to_string(),
        base_url: backend_url,
        path_style: PathStyle::Api,
        routes: Vec::new(),
    }];
    config.health_check.enabled = false;
    config.context.store_path = dir.path().join("context.json").display().to_string();

    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let harness = Harness::build(config, Arc::new(ReqwestTransport::with_client(http))).unwrap();
    let router = HarnessServer::new(Arc::new(harness)).router();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_control_api_runs_operations_and_logs_results() {
    let backend = start_programmable_backend(|_| (200, r#"{"id":"1","name":"Ann"}"#.to_string())).await;
    let dir = tempfile::tempdir().unwrap();
    let api = spawn_control_api(backend.base_url(), &dir).await;
    let http = reqwest::Client::builder().no_proxy().build().unwrap();

    let backends: Value = http.get(format!("{}/backends", api)).send().await.unwrap().json().await.unwrap();
    assert_eq!(backends[0]["name"], "mock");
    assert_eq!(backends[0]["state"], "unknown");

    let res = http
        .post(format!("{}/backends/mock/get", api))
        .json(&json!({ "id": "1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let result: Value = res.json().await.unwrap();
    assert_eq!(result["success"], true);
    assert_eq!(result["operation_name"], "Get User");
    assert_eq!(result["payload"]["name"], "Ann");

    let res = http.post(format!("{}/backends/ruby/get", api)).send().await.unwrap();
    assert_eq!(res.status(), 404);
    let res = http.post(format!("{}/backends/mock/patch", api)).send().await.unwrap();
    assert_eq!(res.status(), 400);

    let results: Value = http.get(format!("{}/results", api)).send().await.unwrap().json().await.unwrap();
    assert_eq!(results["count"], 1);
    assert_eq!(results["latest"]["operation"], "mock: Get User");

    let cleared: Value = http.delete(format!("{}/results", api)).send().await.unwrap().json().await.unwrap();
    assert_eq!(cleared["cleared"], 1);
}

#[tokio::test]
async fn test_control_api_context_and_sdk() {
    let dir = tempfile::tempdir().unwrap();
    let api = spawn_control_api("http://127.0.0.1:9".to_string(), &dir).await;
    let http = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = http
        .put(format!("{}/context", api))
        .json(&json!({ "user_context": "{bad", "app_context": "{}" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let context: Value = http.get(format!("{}/context", api)).send().await.unwrap().json().await.unwrap();
    assert_eq!(context["user_context"]["user_id"], "test-user-123");

    let res = http
        .post(format!("{}/sdk/create", api))
        .json(&json!({ "doc_type": "Users", "doc_id": "u1", "data": r#"{"name":"Ann"}"# }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let got: Value = http
        .post(format!("{}/sdk/get", api))
        .json(&json!({ "doc_type": "Users", "doc_id": "u1" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(got["result"]["name"], "Ann");

    let res = http
        .post(format!("{}/sdk/get", api))
        .json(&json!({ "doc_type": "Users", "doc_id": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}
