/// Access-token gate, account lookup and todo handling through the real router

mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use common::{with_header, TestContext, RS256_HEADER};
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new();

    let (status, body) = ctx.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_ping_without_header() {
    let ctx = TestContext::new();

    let (status, body) = ctx.get("/api/v1/todo/ping", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "Missing credentials");
}

#[tokio::test]
async fn test_ping_with_access_token() {
    let ctx = TestContext::new();
    let account = ctx.create_account("alice", "s3cret!").await;
    let bearer = ctx.bearer_for(&account);

    let (status, body) = ctx.get("/api/v1/todo/ping", Some(&bearer)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user-id"], account.id);
    assert_eq!(body["code"], 200);
}

#[tokio::test]
async fn test_ping_with_raw_token() {
    let ctx = TestContext::new();
    let token = ctx.tokens.issue_access(5, "alice").unwrap();

    let (status, body) = ctx.get("/api/v1/todo/ping", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user-id"], 5);
}

#[tokio::test]
async fn test_ping_with_refresh_token() {
    let ctx = TestContext::new();
    let refresh = ctx.tokens.issue_refresh(5).unwrap();

    let (status, body) = ctx
        .get("/api/v1/todo/ping", Some(&format!("Bearer {}", refresh)))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "access token required");
}

#[tokio::test]
async fn test_ping_with_non_hmac_access_token() {
    let ctx = TestContext::new();
    let token = ctx.tokens.issue_access(5, "alice").unwrap();
    let substituted = with_header(&token, RS256_HEADER);

    let (status, body) = ctx
        .get("/api/v1/todo/ping", Some(&format!("Bearer {}", substituted)))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "token isn't valid");
}

#[tokio::test]
async fn test_ping_with_expired_access_token() {
    let ctx = TestContext::new();
    let token = ctx
        .tokens
        .clone()
        .with_lifetimes(Duration::seconds(-60), Duration::hours(72))
        .issue_access(5, "alice")
        .unwrap();

    let (status, _) = ctx.get("/api/v1/todo/ping", Some(&token)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_account_routes() {
    let ctx = TestContext::new();
    let alice = ctx.create_account("alice", "s3cret!").await;
    let bob = ctx.create_account("bob", "hunter2").await;
    let bearer = ctx.bearer_for(&alice);

    let (status, body) = ctx
        .get(&format!("/api/v1/account/user/{}", bob.id), Some(&bearer))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user-name"], "bob");

    let (status, body) = ctx.get("/api/v1/account/users", Some(&bearer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = ctx.get("/api/v1/account/user/999", Some(&bearer)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.get("/api/v1/account/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_todo_lifecycle() {
    let ctx = TestContext::new();
    let alice = ctx.create_account("alice", "s3cret!").await;
    let bearer = ctx.bearer_for(&alice);

    let (status, todo) = ctx
        .request(
            Method::POST,
            "/api/v1/todo/add",
            Some(&bearer),
            Some(json!({ "title": "milk", "description": "2 litres" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(todo["title"], "milk");
    assert_eq!(todo["closed"], false);
    let id = todo["id"].as_i64().unwrap();

    let (status, list) = ctx.get("/api/v1/todo/my/todos", Some(&bearer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, fetched) = ctx.get(&format!("/api/v1/todo/{}", id), Some(&bearer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["description"], "2 litres");

    let (status, toggled) = ctx
        .request(
            Method::PUT,
            &format!("/api/v1/todo/toggle/{}", id),
            Some(&bearer),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["closed"], true);

    let (status, removed) = ctx
        .request(
            Method::DELETE,
            &format!("/api/v1/todo/remove/{}", id),
            Some(&bearer),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["code"], 200);

    let (status, _) = ctx.get(&format!("/api/v1/todo/{}", id), Some(&bearer)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_todo_add_validation() {
    let ctx = TestContext::new();
    let bearer = format!("Bearer {}", ctx.tokens.issue_access(1, "alice").unwrap());

    let (status, _) = ctx
        .request(
            Method::POST,
            "/api/v1/todo/add",
            Some(&bearer),
            Some(json!({ "title": "" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_todos_are_scoped_to_owner() {
    let ctx = TestContext::new();
    let alice = ctx.create_account("alice", "s3cret!").await;
    let bob = ctx.create_account("bob", "hunter2").await;
    let alice_bearer = ctx.bearer_for(&alice);
    let bob_bearer = ctx.bearer_for(&bob);

    let (_, todo) = ctx
        .request(
            Method::POST,
            "/api/v1/todo/add",
            Some(&alice_bearer),
            Some(json!({ "title": "secret plans" })),
        )
        .await;
    let id = todo["id"].as_i64().unwrap();

    let (status, list) = ctx.get("/api/v1/todo/my/todos", Some(&bob_bearer)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(list.as_array().unwrap().is_empty());

    let (status, _) = ctx
        .get(&format!("/api/v1/todo/{}", id), Some(&bob_bearer))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .request(
            Method::PUT,
            &format!("/api/v1/todo/toggle/{}", id),
            Some(&bob_bearer),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .request(
            Method::DELETE,
            &format!("/api/v1/todo/remove/{}", id),
            Some(&bob_bearer),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .get(&format!("/api/v1/todo/{}", id), Some(&alice_bearer))
        .await;
    assert_eq!(status, StatusCode::OK);
}
