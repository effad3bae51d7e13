//! Notice endpoints
//!
//! Reading is public. Writing requires a bearer token: creation is limited
//! to admins unless open submission is enabled, everything else is admin
//! only.
//!
//! - `GET /api/notices?category=&status=&search=`
//! - `GET /api/notices/:id`
//! - `POST /api/notices`
//! - `PUT /api/notices/:id`
//! - `DELETE /api/notices/:id`
//! - `POST /api/notices/:id/status`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use chrono::NaiveDate;
use noticehub_shared::{
    auth::{
        authorization::{require_admin, require_notice_submitter},
        middleware::AuthContext,
    },
    models::notice::{
        deserialize_optional_date, CreateNotice, Notice, NoticeFields, NoticeFilter, NoticeStatus,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Query string for listings
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

/// Body for create and update
#[derive(Debug, Deserialize, Validate)]
pub struct NoticeRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "Category is required"))]
    pub category: String,

    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub expiry: Option<NaiveDate>,
}

impl NoticeRequest {
    /// Trims and validates, yielding the stored fields
    fn into_fields(self) -> ApiResult<NoticeFields> {
        let trimmed = NoticeRequest {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            category: self.category.trim().to_lowercase(),
            expiry: self.expiry,
        };
        trimmed.validate()?;

        Ok(NoticeFields {
            title: trimmed.title,
            content: trimmed.content,
            category: trimmed.category,
            expiry: trimmed.expiry,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub ok: bool,
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { ok: true })
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Notice not found".to_string())
}

/// Lists unexpired notices, newest first
pub async fn list_notices(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Notice>>> {
    let Query(query) = query?;

    let filter = NoticeFilter::from_query(
        query.category.as_deref(),
        query.status.as_deref(),
        query.search.as_deref(),
    )
    .map_err(ApiError::BadRequest)?;

    let notices = state.store.list_notices(&filter, state.today()).await?;
    Ok(Json(notices))
}

/// Fetches one notice; expired notices are treated as missing
pub async fn get_notice(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Notice>> {
    let Path(id) = id.map_err(|_| not_found())?;

    let notice = state
        .store
        .find_notice(id)
        .await?
        .filter(|n| !n.is_expired_on(state.today()))
        .ok_or_else(not_found)?;

    Ok(Json(notice))
}

/// Creates a pending notice authored by the caller
pub async fn create_notice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<NoticeRequest>, JsonRejection>,
) -> ApiResult<Json<CreatedResponse>> {
    require_notice_submitter(&auth, state.config.policy.open_submission)?;
    let Json(req) = payload?;
    let fields = req.into_fields()?;

    let notice = state
        .store
        .create_notice(CreateNotice {
            fields,
            author: auth.display_name().to_string(),
            date: state.today(),
        })
        .await?;

    tracing::info!(notice_id = %notice.id, author = %notice.author, "Notice created");

    Ok(Json(CreatedResponse {
        ok: true,
        id: notice.id,
    }))
}

/// Replaces the editable fields of a notice
pub async fn update_notice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<NoticeRequest>, JsonRejection>,
) -> ApiResult<Json<OkResponse>> {
    require_admin(&auth)?;
    let Path(id) = id.map_err(|_| not_found())?;
    let Json(req) = payload?;
    let fields = req.into_fields()?;

    state
        .store
        .update_notice(id, fields)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(notice_id = %id, by = %auth.user_id, "Notice updated");
    Ok(OkResponse::ok())
}

pub async fn delete_notice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<OkResponse>> {
    require_admin(&auth)?;
    let Path(id) = id.map_err(|_| not_found())?;

    if !state.store.delete_notice(id).await? {
        return Err(not_found());
    }

    tracing::info!(notice_id = %id, by = %auth.user_id, "Notice deleted");
    Ok(OkResponse::ok())
}

/// Moves a notice to any of the three statuses
pub async fn set_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<Json<OkResponse>> {
    require_admin(&auth)?;
    let Path(id) = id.map_err(|_| not_found())?;
    let Json(req) = payload?;

    let status: NoticeStatus = req
        .status
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid status".to_string()))?;

    state
        .store
        .set_notice_status(id, status)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(notice_id = %id, status = %status, by = %auth.user_id, "Notice status changed");
    Ok(OkResponse::ok())
}
