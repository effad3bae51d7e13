//! Admin user management endpoints

mod common;

use axum::http::StatusCode;
use common::{token_for, TestContext};
use noticehub_shared::models::user::{CreateUser, Role};
use noticehub_shared::store::Store;
use serde_json::json;

#[tokio::test]
async fn test_list_users_with_stats() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/api/users", Some(&ctx.admin_token)).await;
    assert_eq!(status, StatusCode::OK);

    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["email"], "admin@test.local");
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));

    assert_eq!(body["stats"], json!({ "total": 2, "admins": 1, "users": 1 }));
}

#[tokio::test]
async fn test_user_admin_requires_admin() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx.get("/api/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx.get("/api/users", Some(&ctx.user_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/api/users/{}/promote", ctx.user.id);
    let (status, _) = ctx.post(&uri, Some(&ctx.user_token), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_promote_and_demote() {
    let ctx = TestContext::new().await;
    let promote = format!("/api/users/{}/promote", ctx.user.id);
    let demote = format!("/api/users/{}/demote", ctx.user.id);

    let (status, body) = ctx.post(&promote, Some(&ctx.admin_token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    let user = ctx.store.find_user_by_id(ctx.user.id).await.unwrap().unwrap();
    assert_eq!(user.role, Role::Admin);

    // the promoted user's existing token now carries admin rights
    let (status, _) = ctx.get("/api/users", Some(&ctx.user_token)).await;
    assert_eq!(status, StatusCode::OK);

    // idempotent
    let (status, _) = ctx.post(&promote, Some(&ctx.admin_token), json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx.post(&demote, Some(&ctx.admin_token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let user = ctx.store.find_user_by_id(ctx.user.id).await.unwrap().unwrap();
    assert_eq!(user.role, Role::User);

    let (status, _) = ctx.get("/api/users", Some(&ctx.user_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_cannot_target_self() {
    let ctx = TestContext::new().await;

    for uri in [
        format!("/api/users/{}/promote", ctx.admin.id),
        format!("/api/users/{}/demote", ctx.admin.id),
    ] {
        let (status, _) = ctx.post(&uri, Some(&ctx.admin_token), json!({})).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (status, _) = ctx
        .send(
            "DELETE",
            &format!("/api/users/{}", ctx.admin.id),
            Some(&ctx.admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = ctx.store.find_user_by_id(ctx.admin.id).await.unwrap().unwrap();
    assert_eq!(admin.role, Role::Admin);
}

#[tokio::test]
async fn test_delete_user() {
    let ctx = TestContext::new().await;
    let other = ctx
        .store
        .create_user(CreateUser::new("Other Admin", "other@test.local", "h", Role::Admin))
        .await
        .unwrap();
    let uri = format!("/api/users/{}", other.id);

    let (status, _) = ctx.send("DELETE", &uri, Some(&ctx.admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(ctx.store.find_user_by_id(other.id).await.unwrap().is_none());

    let (status, _) = ctx.send("DELETE", &uri, Some(&ctx.admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // a deleted admin's token stops working
    let (status, _) = ctx.get("/api/users", Some(&token_for(&other))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let ctx = TestContext::new().await;
    let uri = format!("/api/users/{}/promote", uuid::Uuid::new_v4());

    let (status, body) = ctx.post(&uri, Some(&ctx.admin_token), json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}
