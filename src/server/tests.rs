use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::core::config::{AppPaths, Settings};
use crate::server::router::router;
use crate::state::AppState;

const BOUNDARY: &str = "ragbot-test-boundary";

fn test_app(settings: Settings) -> (TempDir, Arc<AppState>, Router) {
    let dir = tempfile::tempdir().unwrap();
    let paths = Arc::new(AppPaths::with_dirs(
        dir.path().to_path_buf(),
        dir.path().to_path_buf(),
    ));
    let state = AppState::from_settings(paths, settings).unwrap();
    let app = router(state.clone());
    (dir, state, app)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart(files: &[(&str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, contents) in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n",
                name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(contents);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn root_reports_running() {
    let (_dir, _state, app) = test_app(Settings::default());
    let (status, body) = send(app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["message"], "Retrieval-Augmented QA API is running");
}

#[tokio::test]
async fn health_and_status_describe_pipeline() {
    let (_dir, _state, app) = test_app(Settings::default());
    let (status, body) = send(app.clone(), get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let (status, body) = send(app, get("/api/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["documents"], json!(0));
    assert_eq!(body["embedding_dim"], json!(384));
    assert_eq!(body["top_k"], json!(3));
    assert_eq!(body["embedder"], "hash");
}

#[tokio::test]
async fn config_endpoint_hides_secrets() {
    let mut settings = Settings::default();
    settings.embedder.api_key = Some("super-secret".to_string());
    let (_dir, _state, app) = test_app(settings);

    let (status, body) = send(app, get("/api/config")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["embedding_dim"], json!(384));
    assert_eq!(body["vector_store_type"], "in_memory_flat_ip");
    assert_eq!(body["max_upload_size"], "5MB");
    assert!(!body.to_string().contains("super-secret"));
}

#[tokio::test]
async fn chat_on_empty_store_returns_placeholder() {
    let (_dir, _state, app) = test_app(Settings::default());
    let (status, body) = send(
        app,
        post_json("/api/chat", json!({"prompt": "What is Rust?", "session_id": "s-1"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sources"], json!([]));
    assert_eq!(body["confidence"], Value::Null);
    assert_eq!(body["session_id"], "s-1");
    assert_eq!(
        body["answer"],
        "This is a placeholder answer generated using retrieved context. "
    );
}

#[tokio::test]
async fn blank_prompt_is_bad_request() {
    let (_dir, _state, app) = test_app(Settings::default());
    let (status, body) = send(app, post_json("/api/chat", json!({"prompt": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Query must not be empty.");
}

#[tokio::test]
async fn max_sources_out_of_range_is_bad_request() {
    let (_dir, _state, app) = test_app(Settings::default());
    let (status, body) = send(
        app,
        post_json("/api/chat", json!({"prompt": "hello", "max_sources": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("max_sources"));
}

#[tokio::test]
async fn uploaded_documents_are_retrievable() {
    let (_dir, state, app) = test_app(Settings::default());
    let files: &[(&str, &[u8])] = &[
        ("fruit.txt", b"Apples are red and crunchy fruit."),
        ("space.md", b"Rockets launch satellites into orbit."),
    ];

    let (status, body) = send(app.clone(), multipart(files)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["count"], json!(2));
    assert_eq!(body["file_ids"], json!(["fruit.txt", "space.md"]));
    assert_eq!(body["chunks_ingested"], json!(2));
    assert_eq!(state.pipeline.document_count(), 2);

    let (status, body) = send(
        app,
        post_json(
            "/api/chat",
            json!({"prompt": "Apples are red and crunchy fruit.", "max_sources": 1}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sources"], json!(["Apples are red and crunchy fruit."]));
    assert!(body["confidence"].as_f64().unwrap() > 0.99);
}

#[tokio::test]
async fn unsupported_upload_ingests_nothing() {
    let (_dir, state, app) = test_app(Settings::default());
    let files: &[(&str, &[u8])] = &[("notes.txt", b"fine"), ("photo.png", b"\x89PNG")];

    let (status, body) = send(app, multipart(files)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported file type: photo.png");
    assert_eq!(state.pipeline.document_count(), 0);
}

#[tokio::test]
async fn upload_without_files_is_bad_request() {
    let (_dir, _state, app) = test_app(Settings::default());
    let (status, body) = send(app, multipart(&[])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No files provided");
}

#[tokio::test]
async fn oversized_request_is_payload_too_large() {
    let mut settings = Settings::default();
    settings.upload.max_request_size = 1024;
    let (_dir, state, app) = test_app(settings);
    let contents = vec![b'a'; 4096];

    let (status, body) = send(app, multipart(&[("big.txt", contents.as_slice())])).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "Upload exceeds the request size limit of 1024 bytes");
    assert_eq!(state.pipeline.document_count(), 0);
}
