//! Application state and router builder
//!
//! # Example
//!
//! ```no_run
//! use noticehub_api::{app::{build_router, AppState}, config::Config};
//! use noticehub_shared::store::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let state = AppState::new(Arc::new(MemoryStore::new()), config);
//! let app = build_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:10000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::{auth::require_auth, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, Utc};
use noticehub_shared::store::Store;
use std::{sync::Arc, time::Duration};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler through the `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Current calendar date (UTC) used for expiry checks
    pub fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Builds the complete router
///
/// ```text
/// /
/// ├── GET /health
/// └── /api
///     ├── POST   /signup
///     ├── POST   /login
///     ├── POST   /newsletter
///     ├── GET    /notices
///     ├── GET    /notices/:id
///     │   (bearer token required below)
///     ├── GET    /me
///     ├── POST   /notices
///     ├── PUT    /notices/:id
///     ├── DELETE /notices/:id
///     ├── POST   /notices/:id/status
///     ├── GET    /users
///     ├── POST   /users/:id/promote
///     ├── POST   /users/:id/demote
///     └── DELETE /users/:id
/// ```
///
/// Unmatched requests fall through to `PUBLIC_DIR` when configured, with
/// `index.html` served for unknown paths.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/signup", post(routes::accounts::signup))
        .route("/login", post(routes::accounts::login))
        .route("/newsletter", post(routes::newsletter::subscribe))
        .route("/notices", get(routes::notices::list_notices))
        .route("/notices/:id", get(routes::notices::get_notice));

    let protected_routes = Router::new()
        .route("/me", get(routes::accounts::me))
        .route("/notices", post(routes::notices::create_notice))
        .route(
            "/notices/:id",
            axum::routing::put(routes::notices::update_notice)
                .delete(routes::notices::delete_notice),
        )
        .route("/notices/:id/status", post(routes::notices::set_status))
        .route("/users", get(routes::users::list_users))
        .route("/users/:id/promote", post(routes::users::promote_user))
        .route("/users/:id/demote", post(routes::users::demote_user))
        .route("/users/:id", axum::routing::delete(routes::users::delete_user))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(api_not_found);

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(Duration::from_secs(3600))
    };

    let router = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes);

    let router = match &state.config.api.public_dir {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
        ),
        None => router.fallback(api_not_found),
    };

    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(
            SecurityHeadersLayer::new(state.config.api.production)
                .with_inline_scripts(state.config.api.public_dir.is_some()),
        )
        .with_state(state)
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
