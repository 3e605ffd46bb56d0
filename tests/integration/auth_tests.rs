//! Authentication integration tests.
//!
//! Tests verify:
//! - The correct token grants access to every protected route
//! - Wrong and missing tokens are rejected with 401 before any store access
//! - Public routes need no token

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use super::test_utils::{
    json_request, response_json, test_router, test_router_with_db, StubDetector, TEST_SECRET,
};

fn request_with_token(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("token", token);
    }
    builder.body(Body::empty()).unwrap()
}

// =============================================================================
// Valid Tokens
// =============================================================================

#[tokio::test]
async fn test_correct_token_grants_access() {
    let router = test_router(StubDetector::new()).await;

    let response = router
        .oneshot(request_with_token("GET", "/users/1", Some(TEST_SECRET)))
        .await
        .unwrap();

    // 404 (row absent), not 401: the guard passed.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_correct_token_on_every_protected_route() {
    let router = test_router(StubDetector::new()).await;

    for (method, uri) in [
        ("GET", "/users"),
        ("GET", "/users/1"),
        ("DELETE", "/users/1"),
    ] {
        let response = router
            .clone()
            .oneshot(request_with_token(method, uri, Some(TEST_SECRET)))
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

// =============================================================================
// Rejected Tokens
// =============================================================================

#[tokio::test]
async fn test_wrong_token_rejected() {
    let router = test_router(StubDetector::new()).await;

    let response = router
        .oneshot(request_with_token("GET", "/users/1", Some("wrong-token")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_missing_token_rejected() {
    let router = test_router(StubDetector::new()).await;

    let response = router
        .oneshot(request_with_token("GET", "/users/1", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["error"], "missing_token");
}

#[tokio::test]
async fn test_create_is_guarded() {
    let (router, db) = test_router_with_db(StubDetector::new()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"name":"Ada"}"#))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The guard rejected the request before any store access.
    let rows = facemark::store::users::search(&db, "").await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_token_prefix_rejected() {
    let router = test_router(StubDetector::new()).await;

    let prefix = &TEST_SECRET[..TEST_SECRET.len() - 1];
    let response = router
        .oneshot(request_with_token("GET", "/users/1", Some(prefix)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Public Routes
// =============================================================================

#[tokio::test]
async fn test_health_needs_no_token() {
    let router = test_router(StubDetector::new()).await;

    let response = router
        .oneshot(request_with_token("GET", "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_guard_runs_before_body_parsing() {
    let router = test_router(StubDetector::new()).await;

    // Invalid JSON body, wrong token: the 401 wins.
    let mut request = json_request("POST", "/users", serde_json::json!({"name": "Ada"}));
    request
        .headers_mut()
        .insert("token", "wrong-token".parse().unwrap());

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
