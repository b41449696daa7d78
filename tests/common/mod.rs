//! Shared utilities for integration tests.

use std::fs;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use rewrite_rules::config::AppConfig;
use tempfile::TempDir;
use tower::ServiceExt;

pub const NOT_FOUND_BODY: &str = "<h1>Nothing here</h1>";
pub const LANDING_BODY: &str = "<h1>Landing</h1>";

/// Config pointing at a fresh template directory with a 404 and a landing page.
pub fn site() -> (TempDir, AppConfig) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("404.html"), NOT_FOUND_BODY).unwrap();
    fs::write(dir.path().join("landing.html"), LANDING_BODY).unwrap();

    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.templates.search_paths = vec![dir.path().to_path_buf()];
    (dir, config)
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub fn get_logged_in(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("cookie", "rr_session=valid")
        .body(Body::empty())
        .unwrap()
}

/// Drive one request through the router.
#[allow(dead_code)]
pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

#[allow(dead_code)]
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
