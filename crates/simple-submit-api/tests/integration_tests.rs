//! API tests driving the router in process

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use simple_submit_api::{config::ServerConfig, create_app, AppState};
use tower::ServiceExt;

/// Path to the server fixture relative to the workspace root
const SERVER_CONFIG_PATH: &str = "testing/fixtures/server.yaml";

/// `plugins/simple`, percent-encoded as a single path segment
const CONFIG_URI: &str = "/projects/plugins%2Fsimple/simple-submit-rules";

fn app() -> Router {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = std::path::Path::new(&manifest_dir).parent().unwrap().parent().unwrap();
    let config = ServerConfig::load(workspace_root.join(SERVER_CONFIG_PATH)).unwrap();
    create_app(AppState::from_config(&config).unwrap())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(CONFIG_URI);
    if let Some(user) = user {
        builder = builder.header("X-User", user);
    }
    builder.body(Body::empty()).unwrap()
}

fn put(user: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(CONFIG_URI)
        .header("X-User", user)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_read_config() {
    let app = app();
    let (status, body) = send(&app, get(Some("reader"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "labels": {
                "Code-Review": {
                    "function": "MaxWithBlock",
                    "ignore_self_approval": false,
                    "copy_scores": ["copyMinScore"]
                }
            },
            "comments": { "block_if_unresolved_comments": false }
        })
    );
}

#[tokio::test]
async fn test_read_requires_permission() {
    let app = app();
    let (status, body) = send(&app, get(None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "AUTH");

    let (status, _) = send(&app, get(Some("stranger"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_write_returns_committed_config() {
    let app = app();
    let input = json!({
        "labels": {
            "Code-Review": {
                "function": "MaxNoBlock",
                "ignore_self_approval": true,
                "copy_scores": ["copyMaxScore"]
            }
        },
        "comments": { "block_if_unresolved_comments": true }
    });
    let (status, body) = send(&app, put("admin", input)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["labels"]["Code-Review"]["function"], "MaxNoBlock");
    assert_eq!(body["labels"]["Code-Review"]["copy_scores"], json!(["copyMaxScore"]));
    assert_eq!(body["comments"]["block_if_unresolved_comments"], true);

    let (_, read) = send(&app, get(Some("admin"))).await;
    assert_eq!(read, body);
}

#[tokio::test]
async fn test_write_requires_write_permission() {
    let app = app();
    let input = json!({ "comments": { "block_if_unresolved_comments": true } });
    let (status, _) = send(&app, put("reader", input)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, read) = send(&app, get(Some("reader"))).await;
    assert_eq!(read["comments"]["block_if_unresolved_comments"], false);
}

#[tokio::test]
async fn test_rejected_write_commits_nothing() {
    let app = app();
    let (_, before) = send(&app, get(Some("admin"))).await;

    let input = json!({
        "labels": { "Code-Review": { "function": "NoOp" } },
        "comments": { "block_if_unresolved_comments": true }
    });
    let (status, body) = send(&app, put("admin", input)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "NoOp disallowed for label Code-Review");

    let input = json!({
        "labels": { "Code-Review": { "copy_scores": ["copyAllScoresIfNoCodeChange"] } }
    });
    let (status, body) = send(&app, put("admin", input)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("copyAllScoresIfNoCodeChange"));

    let (_, after) = send(&app, get(Some("admin"))).await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_unknown_label_and_project() {
    let app = app();
    let input = json!({ "labels": { "Verified": { "function": "NoBlock" } } });
    let (status, body) = send(&app, put("admin", input)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "The label Verified does not exist. You can't change its config."
    );

    let request = Request::builder()
        .uri("/projects/nope/simple-submit-rules")
        .header("X-User", "admin")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_count_outcomes() {
    let app = app();
    send(&app, get(Some("reader"))).await;
    send(&app, put("reader", json!({}))).await;
    send(&app, put("admin", json!({}))).await;

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("simple_submit_config_reads_total 1"));
    assert!(text.contains("simple_submit_config_writes_total{outcome=\"forbidden\"} 1"));
    assert!(text.contains("simple_submit_config_writes_total{outcome=\"ok\"} 1"));
}
