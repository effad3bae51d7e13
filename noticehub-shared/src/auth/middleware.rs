//! Bearer-token authentication
//!
//! Extracts the token from `Authorization: Bearer <token>`, validates it, and
//! re-reads the user from the [`Store`] so that deleted accounts are rejected
//! and role changes apply to tokens issued before the change. The resulting
//! [`AuthContext`] is placed in request extensions by the API router.
//!
//! # Example
//!
//! ```
//! use axum::Extension;
//! use noticehub_shared::auth::middleware::AuthContext;
//!
//! async fn handler(Extension(auth): Extension<AuthContext>) -> String {
//!     format!("Hello, {} ({})", auth.name, auth.role)
//! }
//! ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};
use crate::models::user::{Role, User};
use crate::store::Store;

/// Authenticated caller, available to handlers through `Extension`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl AuthContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Name to stamp on content this caller authors
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            &self.email
        } else {
            name
        }
    }
}

/// Error type for authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing authorization header")]
    MissingCredentials,

    /// Header present but not a bearer token
    #[error("{0}")]
    InvalidFormat(String),

    /// Token failed validation
    #[error("{0}")]
    InvalidToken(String),

    /// Token is valid but the account no longer exists
    #[error("Account no longer exists")]
    UnknownUser,

    /// Store lookup failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => {
                AuthError::InvalidToken("Invalid token issuer".to_string())
            }
            other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
        }
    }
}

/// Returns the bearer token from the request headers
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty bearer token".to_string()));
    }

    Ok(token)
}

/// Validates `token` and loads the current state of its user
pub async fn authenticate(
    store: &dyn Store,
    secret: &str,
    token: &str,
) -> Result<AuthContext, AuthError> {
    let claims = validate_token(token, secret)?;

    let user = store
        .find_user_by_id(claims.sub)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?
        .ok_or(AuthError::UnknownUser)?;

    Ok(AuthContext::from_user(&user))
}

/// Convenience wrapper over [`bearer_token`] and [`authenticate`]
pub async fn authenticate_headers(
    store: &dyn Store,
    secret: &str,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;
    authenticate(store, secret, token).await
}
