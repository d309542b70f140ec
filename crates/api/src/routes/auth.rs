//! Authentication route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::auth::{AuthError, hash_password, validate_password, verify_password};
use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::models::user::User;
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Create an account.
#[instrument(skip(state, req))]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    if req.username.trim().is_empty() {
        return Err(AppError::BadRequest("username is required".to_owned()));
    }
    if req.email.trim().is_empty() {
        return Err(AppError::BadRequest("email is required".to_owned()));
    }
    validate_password(&req.password)?;

    let password_hash = hash_password(&req.password)?;

    let users = UserRepository::new(state.pool(), state.config().storage_timeout);
    let user = users
        .create(&req.username, &req.email, &password_hash)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AppError::Auth(AuthError::UserAlreadyExists),
            other => AppError::Database(other),
        })?;

    tracing::info!(user_id = %user.id, "account created");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchange credentials for a signed access token.
#[instrument(skip(state, req))]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let users = UserRepository::new(state.pool(), state.config().storage_timeout);

    let (user, password_hash) = users
        .find_with_password(&req.username)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    verify_password(&req.password, &password_hash)?;

    let access_token = state.tokens().issue(user.id)?;

    Ok(Json(TokenResponse { access_token }))
}
