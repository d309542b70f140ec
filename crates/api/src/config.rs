//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BAZAAR_DATABASE_URL` - `SQLite` connection string (e.g. `sqlite://bazaar.db`)
//! - `BAZAAR_TOKEN_SECRET` - Access-token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `BAZAAR_HOST` - Bind address (default: 127.0.0.1)
//! - `BAZAAR_PORT` - Listen port (default: 8050)
//! - `BAZAAR_TOKEN_TTL_SECS` - Access-token lifetime in seconds (default: 86400)
//! - `BAZAAR_STORAGE_TIMEOUT_SECS` - Per-query storage timeout (default: 5)
//! - `BAZAAR_ALLOWED_ORIGINS` - Comma-separated CORS origins (default: any)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SECRET_LENGTH: usize = 32;
const MIN_SECRET_ENTROPY: f64 = 3.3;

/// Substrings that mark a secret as an unedited placeholder (case-insensitive).
const PLACEHOLDER_MARKERS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `SQLite` database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Access-token signing secret
    pub token_secret: SecretString,
    /// Access-token lifetime
    pub token_ttl: Duration,
    /// Timeout applied to every storage call
    pub storage_timeout: Duration,
    /// CORS origins allowed to call the API (empty = any)
    pub allowed_origins: Vec<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or unparseable,
    /// or if the token secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let token_secret = SecretString::from(require_env("BAZAAR_TOKEN_SECRET")?);
        validate_token_secret(&token_secret, "BAZAAR_TOKEN_SECRET")?;

        Ok(Self {
            database_url: database_url("BAZAAR_DATABASE_URL")?,
            host: parse_env("BAZAAR_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: parse_env("BAZAAR_PORT", 8050_u16)?,
            token_secret,
            token_ttl: Duration::from_secs(parse_env("BAZAAR_TOKEN_TTL_SECS", 86_400_u64)?),
            storage_timeout: Duration::from_secs(parse_env("BAZAAR_STORAGE_TIMEOUT_SECS", 5_u64)?),
            allowed_origins: split_csv(optional_env("BAZAAR_ALLOWED_ORIGINS")),
            sentry_dsn: optional_env("SENTRY_DSN"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Get a required environment variable.
fn require_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse an environment variable into `T`, falling back to `default` when the
/// variable is unset.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Get the database URL, falling back to the generic `DATABASE_URL`.
fn database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Split a comma-separated variable into trimmed, non-empty entries.
fn split_csv(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// Validate the signing secret: long enough, not a placeholder, high entropy.
fn validate_token_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();

    if value.len() < MIN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_SECRET_LENGTH} characters (got {})",
                value.len()
            ),
        ));
    }

    let lower = value.to_lowercase();
    if let Some(marker) = PLACEHOLDER_MARKERS.iter().find(|m| lower.contains(*m)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{marker}')"),
        ));
    }

    // Real signing secrets are random; a low bits-per-char reading means
    // someone typed this one in.
    let entropy = shannon_entropy(value);
    if entropy < MIN_SECRET_ENTROPY {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_SECRET_ENTROPY:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Shannon entropy of a string, in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }

    #[allow(clippy::cast_precision_loss)] // secret lengths are far below 2^52
    let total = s.chars().count() as f64;
    counts
        .into_values()
        .map(|n| {
            #[allow(clippy::cast_precision_loss)]
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}
