//! Authentication middleware and extractors.
//!
//! The middleware verifies the bearer credential once per request and
//! attaches the resolved identity to the request extensions; handlers read
//! it back through the [`CurrentUser`] extractor instead of re-verifying.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use bazaar_core::UserId;

use crate::auth::AuthError;
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated caller, resolved by [`require_auth`].
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(CurrentUser(user_id): CurrentUser) -> impl IntoResponse {
///     format!("Hello, user {user_id}!")
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

/// Middleware that rejects requests without a valid access token.
///
/// The `Authorization` header may carry the raw token or `Bearer <token>`.
/// On success the resolved [`CurrentUser`] is inserted into the request
/// extensions; rejected requests never reach a handler or the storage layer.
///
/// # Errors
///
/// Returns 401 via `AppError::Auth` when the token is missing, malformed,
/// signed with the wrong secret, or expired.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = extract_token(header_value).ok_or(AppError::Auth(AuthError::MissingToken))?;
    let user_id = state.tokens().authenticate(token)?;

    req.extensions_mut().insert(CurrentUser(user_id));
    Ok(next.run(req).await)
}

/// Extract the token from an `Authorization` header value.
///
/// Supports `Bearer <token>` format and raw tokens.
fn extract_token(header: Option<&str>) -> Option<&str> {
    let header = header?;

    if let Some(token) = header.strip_prefix("Bearer ") {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token);
        }
        return None;
    }

    let token = header.trim();
    if token.is_empty() || token.contains(' ') {
        return None;
    }

    Some(token)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .copied()
            .ok_or(AppError::Auth(AuthError::MissingToken))
    }
}
