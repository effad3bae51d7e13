//! Account endpoints
//!
//! - `POST /api/signup` - Create an account
//! - `POST /api/login` - Exchange credentials for a bearer token
//! - `GET /api/me` - Current account (authenticated)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use noticehub_shared::{
    auth::{
        jwt::{create_token, Claims},
        middleware::AuthContext,
        password::{hash_password, validate_password_strength, verify_password, HashParams},
    },
    models::user::{CreateUser, PublicUser, Role},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100 characters)"))]
    pub name: String,

    #[serde(default)]
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email is too long")
    )]
    pub email: String,

    #[serde(default)]
    pub password: String,

    /// Must equal `password` when supplied
    #[serde(default)]
    pub password_confirm: Option<String>,

    /// Only `admin` has an effect, and only if signup may grant it
    #[serde(default)]
    pub role: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,

    /// `admin` when logging in through the admin form
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub token: String,
    pub user: PublicUser,
}

async fn hash_off_thread(password: String, params: HashParams) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password, &params))
        .await
        .map_err(|e| ApiError::InternalError(format!("Hashing task failed: {}", e)))?
        .map_err(ApiError::from)
}

async fn verify_off_thread(password: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::InternalError(format!("Verification task failed: {}", e)))?
        .map_err(ApiError::from)
}

fn requested_role(raw: Option<&str>) -> Role {
    match raw.map(str::trim) {
        Some(r) if r.eq_ignore_ascii_case("admin") => Role::Admin,
        _ => Role::User,
    }
}

/// Creates an account
///
/// # Errors
///
/// - `422`: invalid name, email or password, or mismatched confirmation
/// - `409`: email already registered
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<Json<SignupResponse>> {
    let Json(mut req) = payload?;
    req.name = req.name.trim().to_string();
    req.email = req.email.trim().to_string();

    req.validate()?;

    validate_password_strength(&req.password)
        .map_err(|msg| ApiError::invalid_field("password", msg))?;

    if let Some(confirm) = &req.password_confirm {
        if confirm != &req.password {
            return Err(ApiError::invalid_field(
                "password_confirm",
                "Passwords do not match",
            ));
        }
    }

    let role = match requested_role(req.role.as_deref()) {
        Role::Admin if state.config.policy.signup_allow_admin => Role::Admin,
        Role::Admin => {
            tracing::info!(email = %req.email, "Ignoring admin role requested at signup");
            Role::User
        }
        Role::User => Role::User,
    };

    // Cheap pre-check; the store enforces uniqueness regardless
    if state.store.find_user_by_email(&req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let password_hash = hash_off_thread(req.password, state.config.password).await?;
    let user = state
        .store
        .create_user(CreateUser::new(req.name, &req.email, password_hash, role))
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "Account created");

    Ok(Json(SignupResponse {
        ok: true,
        message: "Account created".to_string(),
    }))
}

/// Verifies credentials and issues a bearer token
///
/// # Errors
///
/// - `400`: email or password missing
/// - `401`: unknown email or wrong password
/// - `403`: admin login requested for a non-admin account
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    let email = req.email.trim();

    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let user = state
        .store
        .find_user_by_email(email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_off_thread(req.password, user.password_hash.clone()).await? {
        tracing::debug!(user_id = %user.id, "Password mismatch");
        return Err(invalid());
    }

    if requested_role(req.role.as_deref()).is_admin() && !user.role.is_admin() {
        return Err(ApiError::Forbidden("Not an admin account".to_string()));
    }

    let claims = Claims::for_user(&user, state.config.token_ttl());
    let token = create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "Login succeeded");

    Ok(Json(LoginResponse {
        ok: true,
        token,
        user: user.into(),
    }))
}

/// Returns the authenticated account
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<PublicUser>> {
    let user = state
        .store
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(user.into()))
}
