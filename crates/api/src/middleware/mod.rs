//! HTTP middleware for the API.

pub mod auth;

pub use auth::{CurrentUser, require_auth};
