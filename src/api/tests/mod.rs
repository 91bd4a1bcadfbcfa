//! HTTP-level tests for the REST API
//!
//! Each test builds a router over a fresh temp storage area and a mock
//! extractor, then drives it with `tower::ServiceExt::oneshot`.

use crate::api::create_router;
use crate::config::Config;
use crate::error::JobError;
use crate::extractor::{ExtractionRequest, MediaExtractor};
use crate::job::JobRunner;
use crate::storage::StorageArea;
use crate::store::StatusStore;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

/// What the mock extractor should do when invoked
enum MockBehavior {
    /// Write a fake output file with the given extension and contents
    Produce(&'static str, &'static [u8]),
    /// Fail with an extraction error
    Fail(&'static str),
}

struct MockExtractor {
    behavior: MockBehavior,
}

#[async_trait]
impl MediaExtractor for MockExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> crate::Result<()> {
        match &self.behavior {
            MockBehavior::Produce(ext, contents) => {
                let mut path = request.output_base.clone().into_os_string();
                path.push(".");
                path.push(ext);
                tokio::fs::write(path, contents).await?;
                Ok(())
            }
            MockBehavior::Fail(reason) => Err(JobError::Extraction {
                reason: reason.to_string(),
            }
            .into()),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

struct TestApp {
    router: Router,
    storage: Arc<StorageArea>,
    _storage_guard: TempDir,
    _tools_guard: TempDir,
}

async fn test_app(behavior: MockBehavior) -> TestApp {
    let storage_dir = TempDir::new().unwrap();
    let tools_dir = TempDir::new().unwrap();

    // A fake transcoder so audio jobs pass the precondition check
    // regardless of what the host has installed
    let fake_ffmpeg = tools_dir.path().join("ffmpeg");
    std::fs::write(&fake_ffmpeg, b"#!/bin/sh\n").unwrap();

    let mut config = Config::default();
    config.storage.dir = storage_dir.path().to_path_buf();
    config.extraction.transcoder_path = Some(fake_ffmpeg);
    config.api.swagger_ui = false;
    let config = Arc::new(config);

    let storage = Arc::new(StorageArea::new(&config.storage.dir).await.unwrap());
    let store = Arc::new(StatusStore::new(storage.clone()));
    let runner = JobRunner::new(
        storage.clone(),
        store,
        Arc::new(MockExtractor { behavior }),
        config.clone(),
    );

    TestApp {
        router: create_router(runner, config),
        storage,
        _storage_guard: storage_dir,
        _tools_guard: tools_dir,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Submit a job and return its id
async fn submit(app: &TestApp, body: Value) -> String {
    let response = app
        .router
        .clone()
        .oneshot(post_json("/download_start", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    json["download_id"].as_str().unwrap().to_string()
}

/// Poll the status endpoint until the job reaches a terminal state
async fn poll_until_terminal(app: &TestApp, id: &str) -> Value {
    for _ in 0..200 {
        let response = app
            .router
            .clone()
            .oneshot(get(&format!("/download_status/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        match json["state"].as_str() {
            Some("complete") | Some("error") => return json,
            _ => tokio::time::sleep(Duration::from_millis(10)).await,
        }
    }
    panic!("job {} never reached a terminal state", id);
}

#[tokio::test]
async fn test_download_start_returns_pollable_id() {
    let app = test_app(MockBehavior::Produce("webm", b"bytes")).await;

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/download_start",
            json!({"url": "https://example.com/watch?v=abc", "format": "mp3"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Download started");

    let id = json["download_id"].as_str().unwrap();
    assert_eq!(id.len(), 8);
    assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn test_download_start_without_url_is_rejected() {
    let app = test_app(MockBehavior::Produce("webm", b"bytes")).await;

    let response = app
        .router
        .clone()
        .oneshot(post_json("/download_start", json!({"format": "mp3"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "No URL provided");
}

#[tokio::test]
async fn test_download_start_blank_url_is_rejected() {
    let app = test_app(MockBehavior::Produce("webm", b"bytes")).await;

    let response = app
        .router
        .clone()
        .oneshot(post_json("/download_start", json!({"url": "   "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_format_falls_back_to_audio() {
    let app = test_app(MockBehavior::Produce("webm", b"bytes")).await;

    let id = submit(
        &app,
        json!({"url": "https://example.com/v", "format": "flac"}),
    )
    .await;
    let status = poll_until_terminal(&app, &id).await;

    assert_eq!(status["state"], "complete");
    assert_eq!(status["filename"], format!("{}_media.mp3", id));
}

#[tokio::test]
async fn test_nonstring_format_falls_back_to_audio() {
    let app = test_app(MockBehavior::Produce("webm", b"bytes")).await;

    // A numeric format must not fail body extraction; it reads as mp3
    let id = submit(
        &app,
        json!({"url": "https://example.com/v", "format": 5}),
    )
    .await;
    let status = poll_until_terminal(&app, &id).await;

    assert_eq!(status["state"], "complete");
    assert_eq!(status["filename"], format!("{}_media.mp3", id));
}

#[tokio::test]
async fn test_cors_headers_present_when_enabled() {
    let app = test_app(MockBehavior::Produce("webm", b"bytes")).await;

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_full_lifecycle_submit_poll_fetch_once() {
    let app = test_app(MockBehavior::Produce("webm", b"fake media payload")).await;

    let id = submit(
        &app,
        json!({"url": "https://example.com/v", "format": "mp3"}),
    )
    .await;

    let status = poll_until_terminal(&app, &id).await;
    assert_eq!(status["state"], "complete");
    let filename = status["filename"].as_str().unwrap().to_string();
    assert_eq!(filename, format!("{}_media.mp3", id));
    assert_eq!(status["size"], "18 B");

    // First fetch streams the artifact as an attachment
    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/get_file/{}", filename)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "audio/mpeg"
    );
    assert!(
        response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains(&filename)
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"fake media payload");

    // Second fetch finds nothing
    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/get_file/{}", filename)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_failed_job_status_carries_upstream_message() {
    let app = test_app(MockBehavior::Fail("Video unavailable")).await;

    let id = submit(&app, json!({"url": "https://example.com/v"})).await;
    let status = poll_until_terminal(&app, &id).await;

    assert_eq!(status["state"], "error");
    assert!(
        status["message"]
            .as_str()
            .unwrap()
            .contains("Video unavailable")
    );
}

#[tokio::test]
async fn test_status_of_unknown_id_reads_as_pending() {
    let app = test_app(MockBehavior::Produce("webm", b"bytes")).await;

    let response = app
        .router
        .clone()
        .oneshot(get("/download_status/neverIssued"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["state"], "pending");
}

#[tokio::test]
async fn test_status_with_malformed_id_is_rejected() {
    let app = test_app(MockBehavior::Produce("webm", b"bytes")).await;

    for bad in [
        "way-too-long-to-be-a-real-job-identifier",
        "has-dashes",
        "dot.dot",
    ] {
        let response = app
            .router
            .clone()
            .oneshot(get(&format!("/download_status/{}", bad)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "id: {}", bad);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "invalid_request");
    }
}

#[tokio::test]
async fn test_get_file_rejects_path_traversal() {
    let app = test_app(MockBehavior::Produce("webm", b"bytes")).await;

    // Encoded separators survive routing as one path segment
    let response = app
        .router
        .clone()
        .oneshot(get("/get_file/..%2F..%2Fetc%2Fpasswd.mp3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .router
        .clone()
        .oneshot(get("/get_file/..%5Csecret.mp3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_get_file_rejects_disallowed_extensions() {
    let app = test_app(MockBehavior::Produce("webm", b"bytes")).await;

    // Status records live in the same directory and must never be served
    std::fs::write(app.storage.resolve("abc123.status.json"), b"{}").unwrap();

    for name in ["abc123.status.json", "abc123_src.webm", "noextension"] {
        let response = app
            .router
            .clone()
            .oneshot(get(&format!("/get_file/{}", name)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "name: {}", name);
    }
}

#[tokio::test]
async fn test_get_file_missing_is_404() {
    let app = test_app(MockBehavior::Produce("webm", b"bytes")).await;

    let response = app
        .router
        .clone()
        .oneshot(get("/get_file/ghost123_media.mp3"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_health_reports_storage_diagnostics() {
    let app = test_app(MockBehavior::Produce("webm", b"bytes")).await;
    std::fs::write(app.storage.resolve("one_media.mp3"), b"x").unwrap();

    let response = app.router.clone().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["files_count"], 1);
    assert!(json["downloads_dir"].as_str().unwrap().contains("/"));
}

#[tokio::test]
async fn test_health_probe_triggers_cleanup() {
    let app = test_app(MockBehavior::Produce("webm", b"bytes")).await;

    let stale = app.storage.resolve("old123_media.mp3");
    std::fs::write(&stale, b"x").unwrap();
    let past = std::time::SystemTime::now() - Duration::from_secs(2 * 3600);
    std::fs::File::options()
        .write(true)
        .open(&stale)
        .unwrap()
        .set_modified(past)
        .unwrap();

    let response = app.router.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!stale.exists());
}

#[tokio::test]
async fn test_openapi_spec_is_served() {
    let app = test_app(MockBehavior::Produce("webm", b"bytes")).await;

    let response = app
        .router
        .clone()
        .oneshot(get("/openapi.json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/download_start"].is_object());
    assert!(json["paths"]["/get_file/{filename}"].is_object());
}
