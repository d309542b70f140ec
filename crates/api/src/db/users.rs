//! User repository.

use std::time::Duration;

use sqlx::SqlitePool;

use bazaar_core::UserId;

use super::{RepositoryError, is_unique_violation, with_timeout};
use crate::models::user::{User, UserProfile};

/// Fields a user may change on their own profile.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<String>,
}

/// Repository for account and profile operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
    timeout: Duration,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository with the request's storage timeout.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        with_timeout(
            self.timeout,
            sqlx::query_as::<_, User>(
                r"
                INSERT INTO users (username, email, password_hash)
                VALUES ($1, $2, $3)
                RETURNING id, username, email, created_at
                ",
            )
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .fetch_one(self.pool),
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return RepositoryError::Conflict("username or email already exists".to_owned());
            }
            e
        })
    }

    /// Look up an account and its password hash by username.
    ///
    /// Returns `None` if no such account exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Timeout` or `RepositoryError::Database` on
    /// storage failure.
    pub async fn find_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = with_timeout(
            self.timeout,
            sqlx::query_as::<_, UserWithPassword>(
                r"
                SELECT id, username, email, created_at, password_hash
                FROM users
                WHERE username = $1
                ",
            )
            .bind(username)
            .fetch_optional(self.pool),
        )
        .await?;

        Ok(row.map(|r| {
            (
                User {
                    id: r.id,
                    username: r.username,
                    email: r.email,
                    created_at: r.created_at,
                },
                r.password_hash,
            )
        }))
    }

    /// Get a user's profile by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Timeout` or `RepositoryError::Database` on
    /// storage failure.
    pub async fn get_profile(
        &self,
        user_id: UserId,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        let profile = with_timeout(
            self.timeout,
            sqlx::query_as::<_, UserProfile>(
                r"
                SELECT id, username, email, name, gender, mobile, address, image_url
                FROM users
                WHERE id = $1
                ",
            )
            .bind(user_id)
            .fetch_optional(self.pool),
        )
        .await?;

        Ok(profile)
    }

    /// Update a user's profile fields; omitted fields keep their value.
    ///
    /// Absence is detected via the affected-row count, not a prior
    /// existence check.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        changes: &ProfileChanges,
    ) -> Result<(), RepositoryError> {
        let result = with_timeout(
            self.timeout,
            sqlx::query(
                r"
                UPDATE users
                SET name = COALESCE($2, name),
                    gender = COALESCE($3, gender),
                    mobile = COALESCE($4, mobile),
                    address = COALESCE($5, address)
                WHERE id = $1
                ",
            )
            .bind(user_id)
            .bind(changes.name.as_deref())
            .bind(changes.gender.as_deref())
            .bind(changes.mobile.as_deref())
            .bind(changes.address.as_deref())
            .execute(self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

/// Row shape for the login lookup.
#[derive(sqlx::FromRow)]
struct UserWithPassword {
    id: UserId,
    username: String,
    email: String,
    created_at: chrono::DateTime<chrono::Utc>,
    password_hash: String,
}
