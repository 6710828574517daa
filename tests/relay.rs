use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use fieldnotes::application::{relay::RelayService, repos::RepositoryBackend};
use fieldnotes::infra::{filesystem::FilesystemBackend, http::build_router};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const LIMIT: usize = 1024 * 1024;

fn router(admin_key: Option<&str>, root: Option<&TempDir>) -> Router {
    let backend = root.map(|dir| {
        let backend: Arc<dyn RepositoryBackend> = Arc::new(FilesystemBackend::new(dir.path()));
        backend
    });
    build_router(RelayService::new(admin_key, backend), LIMIT)
}

async fn send(app: Router, method: Method, body: Body) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri("/api/publish")
        .header("content-type", "application/json")
        .body(body)
        .expect("request should build");
    let response = app.oneshot(request).await.expect("router should respond");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), LIMIT)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn publish_body(key: &str) -> Body {
    Body::from(
        json!({
            "accessKey": key,
            "message": "research(log): Test [web-commit]",
            "files": [
                {"path": "content/articles/test-post.zh.md", "content": "---\nlang: zh\n---\n\n# 测试"},
                {"path": "content/articles/test-post.en.md", "content": "---\nlang: en\n---\n\n# Test"},
                {"path": "public/images/test-post/a.png", "content": STANDARD.encode([0x89_u8, b'P', b'N', b'G']), "isBinary": true}
            ]
        })
        .to_string(),
    )
}

#[tokio::test]
async fn non_post_requests_are_rejected() {
    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let (status, body) = send(router(Some("secret123"), None), method, Body::empty()).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({"message": "Method Not Allowed"}));
    }
}

#[tokio::test]
async fn wrong_key_is_unauthorized_before_config_check() {
    let (status, body) = send(router(Some("secret123"), None), Method::POST, publish_body("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"message": "Unauthorized: Invalid Access Key"}));
}

#[tokio::test]
async fn missing_admin_key_rejects_everyone() {
    let dir = TempDir::new().expect("tempdir");
    let (status, _) = send(router(None, Some(&dir)), Method::POST, publish_body("")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_upstream_configuration_is_reported() {
    let (status, body) = send(router(Some("secret123"), None), Method::POST, publish_body("secret123")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"message": "Server Configuration Error: Missing Env Vars"})
    );
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let (status, body) = send(
        router(Some("secret123"), None),
        Method::POST,
        Body::from("{not json"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn authorized_batch_is_written_in_full() {
    let dir = TempDir::new().expect("tempdir");
    let (status, body) = send(router(Some("secret123"), Some(&dir)), Method::POST, publish_body("secret123")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Content committed to repository."})
    );
    let en = std::fs::read_to_string(dir.path().join("content/articles/test-post.en.md"))
        .expect("en mirror");
    assert!(en.ends_with("# Test"));
    let image = std::fs::read(dir.path().join("public/images/test-post/a.png")).expect("image");
    assert_eq!(image, [0x89_u8, b'P', b'N', b'G']);
}

#[tokio::test]
async fn escaping_path_fails_the_batch() {
    let dir = TempDir::new().expect("tempdir");
    let body = Body::from(
        json!({
            "accessKey": "secret123",
            "files": [{"path": "../outside.md", "content": "x"}]
        })
        .to_string(),
    );
    let (status, body) = send(router(Some("secret123"), Some(&dir)), Method::POST, body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().is_some_and(|m| m.contains("outside.md")));
}
