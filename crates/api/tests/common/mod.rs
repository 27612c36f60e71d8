use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use novagen_api::config::ServerConfig;
use novagen_api::router::build_app_router;
use novagen_api::state::AppState;
use novagen_core::config::GenerationConfig;

/// Credential the fake upstream accepts.
pub const TEST_API_KEY: &str = "test-key";

/// Job id the fake upstream assigns to every new prompt.
pub const SUBMITTED_ID: &str = "abc123";

/// Job id the fake upstream assigns to every button action.
pub const DERIVED_ID: &str = "def456";

/// Job id whose status fetch always fails upstream.
pub const BROKEN_ID: &str = "broken";

// ---------------------------------------------------------------------------
// Fake remote service
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct Upstream {
    base_url: String,
    fetches: Arc<AtomicUsize>,
}

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {TEST_API_KEY}");
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str())
}

async fn imagine(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    assert_eq!(body["timeout"], 900);
    Json(json!({ "messageId": SUBMITTED_ID, "prompt": body["prompt"] })).into_response()
}

/// First fetch of a job reports progress, every later one reports `DONE`
/// with two images served by this same upstream.
async fn fetch(
    State(upstream): State<Upstream>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if id == BROKEN_ID {
        return (StatusCode::BAD_GATEWAY, "upstream exploded").into_response();
    }

    let body = if upstream.fetches.fetch_add(1, Ordering::SeqCst) == 0 {
        json!({ "messageId": id, "status": "IN_PROGRESS", "progress": "40%" })
    } else {
        json!({
            "messageId": id,
            "status": "DONE",
            "progress": 100,
            "data": {
                "images": [
                    format!("{}/files/a.png", upstream.base_url),
                    format!("{}/files/b.jpg", upstream.base_url),
                ]
            },
            "buttons": ["U1", "U2", "V1", "V2"],
        })
    };
    Json(body).into_response()
}

async fn button(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    assert!(body["messageId"].is_string());
    Json(json!({ "data": { "messageId": DERIVED_ID } })).into_response()
}

async fn account_info(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({ "credits": 42, "creditsExtra": 5, "email": "fox@example.com" })).into_response()
}

/// Serve a fake generation service on an ephemeral port and return its
/// base URL.
pub async fn spawn_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let upstream = Upstream {
        base_url: base_url.clone(),
        fetches: Arc::new(AtomicUsize::new(0)),
    };
    let router = Router::new()
        .route("/nova/imagine", post(imagine))
        .route("/message/fetch/{id}", get(fetch))
        .route("/nova/button", post(button))
        .route("/subscription/account-info", get(account_info))
        .route("/files/a.png", get(|| async { b"png-bytes".to_vec() }))
        .route("/files/b.jpg", get(|| async { b"jpg-bytes".to_vec() }))
        .with_state(upstream);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    base_url
}

// ---------------------------------------------------------------------------
// App under test
// ---------------------------------------------------------------------------

/// A running app plus the temporary output directory backing it. The
/// directory is removed when this is dropped.
pub struct TestApp {
    pub router: Router,
    pub output: TempDir,
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(generation: GenerationConfig) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5000".to_string()],
        request_timeout_secs: 30,
        generation,
    }
}

/// Build the full application router against a fresh fake upstream.
pub async fn build_test_app() -> TestApp {
    let base_url = spawn_upstream().await;
    build_test_app_with(Some(TEST_API_KEY), &base_url)
}

/// Build the full application router with an explicit credential and
/// upstream. The router carries the same middleware stack as production.
pub fn build_test_app_with(api_key: Option<&str>, base_url: &str) -> TestApp {
    let output = tempfile::tempdir().unwrap();
    let generation = GenerationConfig {
        api_key: api_key.map(str::to_string),
        base_url: base_url.to_string(),
        output_dir: output.path().to_path_buf(),
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    };
    let config = test_config(generation);
    let router = build_app_router(AppState::new(config.clone()), &config).unwrap();

    TestApp { router, output }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a request through the app and return the status and raw body.
pub async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

/// Send a request through the app and parse the JSON body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send_raw(app, request).await;
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
