#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use lenderoo_api::config::ServerConfig;
use lenderoo_api::router::build_app_router;
use lenderoo_api::state::AppState;
use lenderoo_db::auth::StaticAuthProvider;
use lenderoo_db::memory::MemoryRemoteStore;
use lenderoo_db::object_storage::{FileObjectStorage, MemoryObjectStorage, ObjectStorage};
use lenderoo_services::lending::LendingService;

pub const TEST_USER: &str = "test-user";
pub const FILES_BASE_URL: &str = "http://files.test/files";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:8081".to_string()],
        request_timeout_secs: 30,
        due_soon_days: 3,
        files_dir: std::env::temp_dir().join("lenderoo-api-tests-unused"),
        files_base_url: FILES_BASE_URL.to_string(),
        user_id: Some(TEST_USER.to_string()),
        user_email: None,
    }
}

/// The full application over in-memory stores, plus the remote store for
/// direct assertions.
pub fn build_test_app() -> (Router, Arc<MemoryRemoteStore>) {
    build_app_with_auth(StaticAuthProvider::signed_in(TEST_USER, None))
}

pub fn build_app_with_auth(auth: StaticAuthProvider) -> (Router, Arc<MemoryRemoteStore>) {
    let config = test_config();
    let storage = Arc::new(MemoryObjectStorage::new(FILES_BASE_URL));
    build_app(config, auth, storage)
}

/// The application with images written to, and served from, `files_dir`.
pub fn build_app_with_files(files_dir: &Path) -> (Router, Arc<MemoryRemoteStore>) {
    let config = ServerConfig {
        files_dir: files_dir.to_path_buf(),
        ..test_config()
    };
    let storage = Arc::new(FileObjectStorage::new(files_dir, FILES_BASE_URL));
    build_app(
        config,
        StaticAuthProvider::signed_in(TEST_USER, None),
        storage,
    )
}

fn build_app(
    config: ServerConfig,
    auth: StaticAuthProvider,
    storage: Arc<dyn ObjectStorage>,
) -> (Router, Arc<MemoryRemoteStore>) {
    let remote = Arc::new(MemoryRemoteStore::new());
    let lending = LendingService::new(
        remote.clone(),
        Arc::new(auth),
        storage,
        config.status_config(),
    );
    let state = AppState {
        lending,
        pool: None,
        config: Arc::new(config),
    };
    (build_app_router(state), remote)
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
