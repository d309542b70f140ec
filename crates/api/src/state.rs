//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::TokenService;
use crate::config::ApiConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: SqlitePool,
    tokens: TokenService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The token service is derived from the configured signing secret and
    /// lives for the whole process.
    #[must_use]
    pub fn new(config: ApiConfig, pool: SqlitePool) -> Self {
        let tokens = TokenService::new(&config.token_secret, config.token_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }
}
