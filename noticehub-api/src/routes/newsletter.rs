//! Newsletter subscription
//!
//! `POST /api/newsletter {email}`; public.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::notices::OkResponse,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[serde(default)]
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email is too long")
    )]
    pub email: String,
}

pub async fn subscribe(
    State(state): State<AppState>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> ApiResult<Json<OkResponse>> {
    let Json(mut req) = payload?;
    req.email = req.email.trim().to_string();
    req.validate()?;

    if !state.store.subscribe(&req.email).await? {
        return Err(ApiError::Conflict("Already subscribed".to_string()));
    }

    tracing::info!("Newsletter subscription added");
    Ok(OkResponse::ok())
}
