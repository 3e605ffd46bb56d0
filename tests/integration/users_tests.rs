//! User CRUD integration tests.
//!
//! Drives the full router: create, read, search, update, delete, and the
//! 404 paths for missing rows.

use axum::http::StatusCode;
use tower::ServiceExt;

use super::test_utils::{bare_request, json_request, response_json, test_router, StubDetector};

#[tokio::test]
async fn test_create_returns_201_with_user() {
    let router = test_router(StubDetector::new()).await;

    let response = router
        .oneshot(json_request("POST", "/users", serde_json::json!({"name": "Ada"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "Ada");
}

#[tokio::test]
async fn test_create_then_read_round_trip() {
    let router = test_router(StubDetector::new()).await;

    let created = router
        .clone()
        .oneshot(json_request("POST", "/users", serde_json::json!({"name": "Ada"})))
        .await
        .unwrap();
    let created = response_json(created).await;

    let response = router
        .oneshot(bare_request("GET", &format!("/users/{}", created["id"])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body, created);
}

#[tokio::test]
async fn test_read_missing_returns_404_not_500() {
    let router = test_router(StubDetector::new()).await;

    let response = router.oneshot(bare_request("GET", "/users/42")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_update_changes_name_and_keeps_id() {
    let router = test_router(StubDetector::new()).await;

    let created = router
        .clone()
        .oneshot(json_request("POST", "/users", serde_json::json!({"name": "Ada"})))
        .await
        .unwrap();
    let id = response_json(created).await["id"].clone();

    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/users/{}", id),
            serde_json::json!({"name": "Ada Lovelace"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["id"], id);
    assert_eq!(body["name"], "Ada Lovelace");

    // The change is visible on a subsequent read.
    let fetched = router
        .oneshot(bare_request("GET", &format!("/users/{}", id)))
        .await
        .unwrap();
    assert_eq!(response_json(fetched).await["name"], "Ada Lovelace");
}

#[tokio::test]
async fn test_update_missing_returns_404() {
    let router = test_router(StubDetector::new()).await;

    let response = router
        .oneshot(json_request(
            "PUT",
            "/users/42",
            serde_json::json!({"name": "Nobody"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_then_read_returns_404() {
    let router = test_router(StubDetector::new()).await;

    let created = router
        .clone()
        .oneshot(json_request("POST", "/users", serde_json::json!({"name": "Ada"})))
        .await
        .unwrap();
    let id = response_json(created).await["id"].clone();

    let response = router
        .clone()
        .oneshot(bare_request("DELETE", &format!("/users/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let fetched = router
        .oneshot(bare_request("GET", &format!("/users/{}", id)))
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_returns_404() {
    let router = test_router(StubDetector::new()).await;

    let response = router
        .oneshot(bare_request("DELETE", "/users/42"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_is_case_insensitive_substring() {
    let router = test_router(StubDetector::new()).await;

    for name in ["Ada Lovelace", "Grace Hopper", "Alan Turing"] {
        router
            .clone()
            .oneshot(json_request("POST", "/users", serde_json::json!({"name": name})))
            .await
            .unwrap();
    }

    let response = router
        .oneshot(bare_request("GET", "/users?search=lovelace"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["name"], "Ada Lovelace");
}

#[tokio::test]
async fn test_search_without_param_returns_all() {
    let router = test_router(StubDetector::new()).await;

    for name in ["Ada", "Grace"] {
        router
            .clone()
            .oneshot(json_request("POST", "/users", serde_json::json!({"name": name})))
            .await
            .unwrap();
    }

    let response = router.oneshot(bare_request("GET", "/users")).await.unwrap();

    let body = response_json(response).await;
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_identifiers_are_not_reused_across_users() {
    let router = test_router(StubDetector::new()).await;

    let first = router
        .clone()
        .oneshot(json_request("POST", "/users", serde_json::json!({"name": "Ada"})))
        .await
        .unwrap();
    let second = router
        .oneshot(json_request("POST", "/users", serde_json::json!({"name": "Grace"})))
        .await
        .unwrap();

    let first = response_json(first).await;
    let second = response_json(second).await;
    assert_ne!(first["id"], second["id"]);
}
