//! Database operations for the API.
//!
//! # Tables
//!
//! - `users` - Accounts and profile fields
//! - `categories` - Product categories
//! - `products` - Catalog entries
//! - `cart_lines` - One row per (user, product) pair a user intends to buy
//!
//! # Migrations
//!
//! Migrations are embedded from `crates/api/migrations/` and run at startup.

pub mod cart;
pub mod products;
pub mod users;

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors from the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The storage layer did not answer within the request's budget.
    #[error("storage operation timed out")]
    Timeout,
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// The database file is created if missing; WAL journaling and a busy
/// timeout keep concurrent writers from failing fast on the write lock.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Run a storage future under the request's timeout budget.
///
/// A timed-out call surfaces as `RepositoryError::Timeout` and never reports
/// a partial mutation.
pub(crate) async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T, sqlx::Error>> + Send,
) -> Result<T, RepositoryError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(RepositoryError::from),
        Err(_) => Err(RepositoryError::Timeout),
    }
}

/// Whether an error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &RepositoryError) -> bool {
    matches!(
        err,
        RepositoryError::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation()
    )
}
