//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::UserId;

/// A registered account (safe for client responses - no password hash).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// An account together with its editable profile fields.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    /// Unique user ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Full name.
    pub name: Option<String>,
    /// Gender.
    pub gender: Option<String>,
    /// Mobile number.
    pub mobile: Option<String>,
    /// Shipping address.
    pub address: Option<String>,
    /// URL of the profile picture.
    pub image_url: Option<String>,
}
