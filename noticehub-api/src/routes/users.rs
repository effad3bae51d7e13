//! User administration endpoints (admin only)
//!
//! - `GET /api/users` - All accounts plus role tallies
//! - `POST /api/users/:id/promote` - Grant admin
//! - `POST /api/users/:id/demote` - Revoke admin
//! - `DELETE /api/users/:id` - Remove an account
//!
//! Admins cannot target their own account with any of these.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::notices::OkResponse,
};
use axum::{
    extract::{rejection::PathRejection, Path, State},
    Extension, Json,
};
use noticehub_shared::{
    auth::{
        authorization::{forbid_self_target, require_admin},
        middleware::AuthContext,
    },
    models::user::{PublicUser, Role, UserStats},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<PublicUser>,
    pub stats: UserStats,
}

fn not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserListResponse>> {
    require_admin(&auth)?;

    let users = state.store.list_users().await?;
    let stats = UserStats::tally(&users);

    Ok(Json(UserListResponse {
        users: users.into_iter().map(PublicUser::from).collect(),
        stats,
    }))
}

async fn change_role(
    state: &AppState,
    auth: &AuthContext,
    id: Result<Path<Uuid>, PathRejection>,
    role: Role,
) -> ApiResult<Json<OkResponse>> {
    require_admin(auth)?;
    let Path(id) = id.map_err(|_| not_found())?;
    forbid_self_target(auth, id)?;

    let user = state
        .store
        .set_user_role(id, role)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(user_id = %user.id, role = %user.role, by = %auth.user_id, "Role changed");
    Ok(OkResponse::ok())
}

pub async fn promote_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<OkResponse>> {
    change_role(&state, &auth, id, Role::Admin).await
}

pub async fn demote_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<OkResponse>> {
    change_role(&state, &auth, id, Role::User).await
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<OkResponse>> {
    require_admin(&auth)?;
    let Path(id) = id.map_err(|_| not_found())?;
    forbid_self_target(&auth, id)?;

    if !state.store.delete_user(id).await? {
        return Err(not_found());
    }

    tracing::info!(user_id = %id, by = %auth.user_id, "User deleted");
    Ok(OkResponse::ok())
}
