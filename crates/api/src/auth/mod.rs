//! Authentication: access tokens and password handling.

pub mod password;
pub mod token;

pub use password::{hash_password, validate_password, verify_password};
pub use token::{Claims, TokenService};

use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No access token was supplied with the request.
    #[error("missing access token")]
    MissingToken,

    /// The token is malformed or its signature does not verify.
    #[error("invalid access token: {0}")]
    InvalidToken(String),

    /// The token's expiry claim is in the past.
    #[error("access token expired")]
    Expired,

    /// The token verified but its subject is not a valid user id.
    #[error("token subject is not a valid user id")]
    InvalidSubject,

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid username or password")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// A token could not be signed.
    #[error("failed to issue access token: {0}")]
    TokenCreation(String),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
