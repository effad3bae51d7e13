//! Health, newsletter, headers and static fallback

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestContext;
use serde_json::json;
use tower::Service as _;

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "connected");
    assert_eq!(body["backend"], "memory");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_security_headers_on_api_responses() {
    let ctx = TestContext::new().await;
    let request = Request::builder()
        .uri("/api/notices")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("strict-transport-security").is_none());
    let csp = headers.get("content-security-policy").unwrap().to_str().unwrap();
    assert!(!csp.contains("'unsafe-inline'; style-src"));
    assert!(csp.contains("script-src 'self';"));
}

#[tokio::test]
async fn test_newsletter_rejects_overlong_email() {
    let ctx = TestContext::new().await;
    let email = format!("{}@{}com", "r".repeat(64), format!("{}.", "n".repeat(60)).repeat(4));

    let (status, body) = ctx
        .post("/api/newsletter", None, json!({ "email": email }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "email");
}

#[tokio::test]
async fn test_newsletter_subscribe() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post("/api/newsletter", None, json!({ "email": "Reader@Example.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, body) = ctx
        .post("/api/newsletter", None, json!({ "email": "reader@example.com" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Already subscribed");

    let (status, _) = ctx
        .post("/api/newsletter", None, json!({ "email": "nope" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_api_route_is_json_404() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/api/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_public_dir_spa_fallback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>NoticeHub</h1>").unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log('hi');").unwrap();

    let ctx = TestContext::with_config(&[("PUBLIC_DIR", dir.path().to_str().unwrap())]).await;

    let (status, body) = ctx.get("/app.js", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("console.log('hi');"));

    let (status, body) = ctx.get("/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("<h1>NoticeHub</h1>"));

    // the front end's inline onclick handlers need inline scripts
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    let csp = response.headers().get("content-security-policy").unwrap();
    assert!(csp.to_str().unwrap().contains("script-src 'self' 'unsafe-inline';"));

    // API routes still win over the static fallback
    let (status, _) = ctx.get("/api/notices", None).await;
    assert_eq!(status, StatusCode::OK);
}
