//! Shared helpers for integration tests.
//!
//! Each test spawns the real router on an ephemeral port backed by its own
//! temp-file `SQLite` database, then drives it over HTTP with reqwest.

#![allow(dead_code)]

use std::net::Ipv4Addr;
use std::time::Duration;

use reqwest::Client;
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use uuid::Uuid;

use bazaar_api::config::ApiConfig;
use bazaar_api::state::AppState;
use bazaar_api::{db, routes};

/// Signing secret shared by every spawned test app.
pub const TEST_TOKEN_SECRET: &str = "k9#mQ2$vX7!pL4@wR8&nT3*jB6^zD1%fg5";

/// A running API instance plus direct handles for assertions.
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub pool: SqlitePool,
}

/// Build a config pointing at a fresh temp-file database.
fn test_config(database_url: &str) -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from(database_url.to_owned()),
        host: Ipv4Addr::LOCALHOST.into(),
        port: 0,
        token_secret: SecretString::from(TEST_TOKEN_SECRET),
        token_ttl: Duration::from_secs(3600),
        storage_timeout: Duration::from_secs(5),
        allowed_origins: Vec::new(),
        sentry_dsn: None,
    }
}

/// URL of a fresh temp-file database.
fn fresh_db_url() -> String {
    let db_path = std::env::temp_dir().join(format!("bazaar-test-{}.db", Uuid::new_v4()));
    format!("sqlite://{}", db_path.display())
}

/// Create a migrated pool for a database URL.
async fn migrated_pool(url: &str) -> SqlitePool {
    let pool = db::create_pool(&SecretString::from(url.to_owned()))
        .await
        .expect("failed to create test pool");
    db::MIGRATOR
        .run(&pool)
        .await
        .expect("failed to run migrations");

    pool
}

/// Create a migrated pool on a fresh temp-file database.
pub async fn test_pool() -> SqlitePool {
    migrated_pool(&fresh_db_url()).await
}

/// Spawn the full application on an ephemeral port.
pub async fn spawn_app() -> TestApp {
    let url = fresh_db_url();
    let pool = migrated_pool(&url).await;

    let config = test_config(&url);
    let state = AppState::new(config, pool.clone());
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("listener has no local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server error");
    });

    TestApp {
        base_url: format!("http://{addr}"),
        client: Client::new(),
        pool,
    }
}

impl TestApp {
    /// Absolute URL for a path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Register an account and log in, returning the access token.
    pub async fn register_and_login(&self, username: &str) -> String {
        let resp = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "test-passphrase-123",
            }))
            .send()
            .await
            .expect("register request failed");
        assert_eq!(resp.status().as_u16(), 201, "register should succeed");

        let resp = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({
                "username": username,
                "password": "test-passphrase-123",
            }))
            .send()
            .await
            .expect("login request failed");
        assert_eq!(resp.status().as_u16(), 200, "login should succeed");

        let body: Value = resp.json().await.expect("login body is not JSON");
        body["access_token"]
            .as_str()
            .expect("login response has no access_token")
            .to_owned()
    }

    /// Insert a category directly, returning its id.
    pub async fn seed_category(&self) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO categories (name, image_url) VALUES ($1, '') RETURNING id",
        )
        .bind(format!("category-{}", Uuid::new_v4()))
        .fetch_one(&self.pool)
        .await
        .expect("failed to seed category")
    }

    /// Create a product through the API, returning its id.
    pub async fn seed_product(&self, name: &str, price_cents: i64) -> i64 {
        let category_id = self.seed_category().await;

        let resp = self
            .client
            .post(self.url("/products"))
            .json(&json!({
                "name": name,
                "category_id": category_id,
                "price": price_cents,
            }))
            .send()
            .await
            .expect("create product request failed");
        assert_eq!(resp.status().as_u16(), 201, "product creation should succeed");

        let body: Value = resp.json().await.expect("product body is not JSON");
        body["id"].as_i64().expect("product response has no id")
    }

    /// Number of rows in the cart-line table.
    pub async fn cart_line_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM cart_lines")
            .fetch_one(&self.pool)
            .await
            .expect("failed to count cart lines")
    }
}
