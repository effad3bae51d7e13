//! Shared setup for the HTTP integration tests
//!
//! Every test gets its own in-memory store with one admin and one regular
//! user, cheap hashing parameters, and pre-issued tokens for both.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Duration;
use noticehub_api::app::{build_router, AppState};
use noticehub_api::config::Config;
use noticehub_shared::auth::jwt::{create_token, Claims};
use noticehub_shared::auth::password::hash_password;
use noticehub_shared::models::user::{CreateUser, Role, User};
use noticehub_shared::store::{MemoryStore, Store};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::Service as _;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";
pub const ADMIN_PASSWORD: &str = "Admin@123";
pub const USER_PASSWORD: &str = "User@123";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: Router,
    pub config: Config,
    pub admin: User,
    pub user: User,
    pub admin_token: String,
    pub user_token: String,
}

pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("JWT_SECRET", JWT_SECRET),
        ("PASSWORD_MEMORY_KIB", "1024"),
        ("PASSWORD_ITERATIONS", "1"),
        ("PASSWORD_PARALLELISM", "1"),
        ("STORAGE_BACKEND", "memory"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }

    Config::from_lookup(|key| vars.get(key).cloned()).expect("valid test config")
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_config(&[]).await
    }

    pub async fn with_config(overrides: &[(&str, &str)]) -> Self {
        let config = test_config(overrides);
        let store = Arc::new(MemoryStore::new());

        let admin = store
            .create_user(CreateUser::new(
                "Test Admin",
                "admin@test.local",
                hash_password(ADMIN_PASSWORD, &config.password).unwrap(),
                Role::Admin,
            ))
            .await
            .unwrap();
        let user = store
            .create_user(CreateUser::new(
                "Test User",
                "user@test.local",
                hash_password(USER_PASSWORD, &config.password).unwrap(),
                Role::User,
            ))
            .await
            .unwrap();

        let admin_token = token_for(&admin);
        let user_token = token_for(&user);

        let state = AppState::new(store.clone(), config.clone());
        let app = build_router(state);

        Self {
            store,
            app,
            config,
            admin,
            user,
            admin_token,
            user_token,
        }
    }

    /// Sends a request and returns the status and parsed JSON body
    ///
    /// Empty bodies come back as `Value::Null`.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, token, Some(body)).await
    }

    /// Creates a notice as admin and returns its id
    pub async fn create_notice(&self, title: &str, category: &str, expiry: Option<&str>) -> String {
        let (status, body) = self
            .post(
                "/api/notices",
                Some(&self.admin_token),
                serde_json::json!({
                    "title": title,
                    "content": format!("{} details", title),
                    "category": category,
                    "expiry": expiry,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }
}

pub fn token_for(user: &User) -> String {
    create_token(&Claims::for_user(user, Duration::days(1)), JWT_SECRET).unwrap()
}
