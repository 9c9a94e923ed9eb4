#![allow(dead_code)]

use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http_body_util::BodyExt;
use tower::ServiceExt;

use snapbox_api::config::ServerConfig;
use snapbox_api::router::build_app_router;
use snapbox_api::state::AppState;
use snapbox_core::config::MediaConfig;

/// A router wired to its own throwaway storage and temp directories.
pub struct TestApp {
    pub router: Router,
    pub media_dir: PathBuf,
    pub temp_dir: PathBuf,
    _root: tempfile::TempDir,
}

impl TestApp {
    /// Names currently in the storage directory, sorted.
    pub fn media_files(&self) -> Vec<String> {
        list_dir(&self.media_dir)
    }

    /// Names currently in the temp directory, sorted.
    pub fn temp_files(&self) -> Vec<String> {
        list_dir(&self.temp_dir)
    }
}

/// Build a test `ServerConfig` rooted at `root`.
///
/// The encoder points at a binary that does not exist, so every video upload
/// takes the untranscoded fallback path deterministically.
pub fn test_config(root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5000".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
        media: MediaConfig {
            temp_dir: Some(root.join("tmp")),
            ffmpeg_bin: PathBuf::from("/nonexistent/ffmpeg"),
            ..MediaConfig::with_storage_dir(root.join("media"))
        },
    }
}

/// Build the full application router with all middleware layers.
pub fn build_test_app() -> TestApp {
    build_test_app_with(|_, _| {})
}

/// Like [`build_test_app`], letting the caller adjust the config first.
///
/// `configure` receives the temp root so it can place fixtures (such as a
/// fake encoder script) next to the storage directories.
pub fn build_test_app_with(configure: impl FnOnce(&Path, &mut ServerConfig)) -> TestApp {
    let root = tempfile::tempdir().expect("create temp root");
    let mut config = test_config(root.path());
    configure(root.path(), &mut config);
    std::fs::create_dir_all(&config.media.storage_dir).expect("create media dir");
    std::fs::create_dir_all(root.path().join("tmp")).expect("create temp dir");

    let media_dir = config.media.storage_dir.clone();
    let temp_dir = root.path().join("tmp");
    let state = AppState::new(config.clone());

    TestApp {
        router: build_app_router(state, &config),
        media_dir,
        temp_dir,
        _root: root,
    }
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Body::empty(), None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Body::empty(), None).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    let body = Body::from(serde_json::to_vec(&json).expect("serialize body"));
    send(app, Method::POST, uri, body, Some("application/json")).await
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Body,
    content_type: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    let request = builder.body(body).expect("build request");
    app.oneshot(request).await.expect("request failed")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("response body is JSON")
}

fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
