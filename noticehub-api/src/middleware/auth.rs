//! Bearer-token layer
//!
//! Validates the token, reloads the account from the store and inserts
//! [`AuthContext`] into request extensions for handlers to extract.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use noticehub_shared::auth::middleware::{authenticate_headers, AuthContext};

use crate::{app::AppState, error::ApiError};

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth: AuthContext =
        authenticate_headers(state.store.as_ref(), state.jwt_secret(), req.headers()).await?;

    tracing::debug!(user_id = %auth.user_id, role = %auth.role, "Request authenticated");
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
