//! Profile route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use crate::db::RepositoryError;
use crate::db::users::{ProfileChanges, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::user::UserProfile;
use crate::state::AppState;

/// Profile update request body; omitted fields keep their value.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<String>,
}

/// Get the caller's profile.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<UserProfile>> {
    let users = UserRepository::new(state.pool(), state.config().storage_timeout);
    let profile = users
        .get_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))?;

    Ok(Json(profile))
}

/// Update the caller's profile fields.
#[instrument(skip(state, req))]
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<&'static str>> {
    let changes = ProfileChanges {
        name: req.name,
        gender: req.gender,
        mobile: req.mobile,
        address: req.address,
    };

    let users = UserRepository::new(state.pool(), state.config().storage_timeout);
    users
        .update_profile(user_id, &changes)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("user {user_id} not found")),
            other => AppError::Database(other),
        })?;

    Ok(Json("Updated"))
}
