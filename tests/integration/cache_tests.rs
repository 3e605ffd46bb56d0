//! Response cache integration tests.
//!
//! The cache fronts the mutating store operations: identical calls within
//! the expiry window must not reach the store a second time. Observed here
//! through the HTTP surface by counting rows.

use std::time::Duration;

use axum::http::StatusCode;
use tower::ServiceExt;

use facemark::annotate::Annotator;
use facemark::server::{create_router, RouterConfig};
use facemark::store;

use super::test_utils::{
    json_request, response_json, test_db, test_router_with_db, StubDetector, TEST_SECRET,
};

#[tokio::test]
async fn test_repeated_create_returns_cached_row() {
    let (router, db) = test_router_with_db(StubDetector::new()).await;

    let first = router
        .clone()
        .oneshot(json_request("POST", "/users", serde_json::json!({"name": "Ada"})))
        .await
        .unwrap();
    let second = router
        .oneshot(json_request("POST", "/users", serde_json::json!({"name": "Ada"})))
        .await
        .unwrap();

    assert_eq!(first.status(), StatusCode::CREATED);
    assert_eq!(second.status(), StatusCode::CREATED);

    let first = response_json(first).await;
    let second = response_json(second).await;
    assert_eq!(first, second);

    // Only one row was inserted; the second call hit the cache.
    let rows = store::users::search(&db, "").await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_distinct_names_each_reach_the_store() {
    let (router, db) = test_router_with_db(StubDetector::new()).await;

    for name in ["Ada", "Grace"] {
        router
            .clone()
            .oneshot(json_request("POST", "/users", serde_json::json!({"name": name})))
            .await
            .unwrap();
    }

    let rows = store::users::search(&db, "").await.unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_expired_entry_reaches_the_store_again() {
    let db = test_db().await;
    let config = RouterConfig::new(TEST_SECRET)
        .with_cache_policy(100, Duration::from_millis(50));
    let router = create_router(db.clone(), Annotator::new(StubDetector::new()), config);

    router
        .clone()
        .oneshot(json_request("POST", "/users", serde_json::json!({"name": "Ada"})))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    router
        .oneshot(json_request("POST", "/users", serde_json::json!({"name": "Ada"})))
        .await
        .unwrap();

    // Past the TTL the same arguments insert a fresh row.
    let rows = store::users::search(&db, "").await.unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_repeated_update_with_same_args_is_cached() {
    let (router, _db) = test_router_with_db(StubDetector::new()).await;

    let created = router
        .clone()
        .oneshot(json_request("POST", "/users", serde_json::json!({"name": "Ada"})))
        .await
        .unwrap();
    let id = response_json(created).await["id"].clone();

    let uri = format!("/users/{}", id);
    let first = router
        .clone()
        .oneshot(json_request("PUT", &uri, serde_json::json!({"name": "Ada L"})))
        .await
        .unwrap();
    let second = router
        .oneshot(json_request("PUT", &uri, serde_json::json!({"name": "Ada L"})))
        .await
        .unwrap();

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(response_json(first).await, response_json(second).await);
}

#[tokio::test]
async fn test_cached_delete_repeats_prior_result() {
    let (router, db) = test_router_with_db(StubDetector::new()).await;

    let created = router
        .clone()
        .oneshot(json_request("POST", "/users", serde_json::json!({"name": "Ada"})))
        .await
        .unwrap();
    let id = response_json(created).await["id"].clone();

    let uri = format!("/users/{}", id);
    let first = router
        .clone()
        .oneshot(super::test_utils::bare_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::NO_CONTENT);

    // The row is gone, but the cached prior result answers again within the
    // window.
    assert!(store::users::search(&db, "").await.unwrap().is_empty());
    let second = router
        .oneshot(super::test_utils::bare_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::NO_CONTENT);
}
