//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness check
//! GET    /health/ready              - Readiness check (pings the database)
//!
//! # Auth
//! POST   /auth/register             - Create an account
//! POST   /auth/login                - Exchange credentials for an access token
//!
//! # Catalog
//! GET    /products                  - Product listing
//! POST   /products                  - Create a product
//! GET    /products/search?query=    - Search products by name or category
//! GET    /products/{id}             - Product detail
//! GET    /categories                - Category listing
//! GET    /categories/{id}/products  - Products of one category
//!
//! # Cart (requires auth)
//! POST   /cart                      - Add a product (merges repeat adds)
//! GET    /cart                      - List cart lines with their products
//! PATCH  /cart                      - Overwrite a line's quantity and price
//! DELETE /cart                      - Remove a line
//!
//! # Profile (requires auth)
//! GET    /profile                   - Current user's profile
//! PATCH  /profile                   - Update profile fields
//! ```

pub mod auth;
pub mod cart;
pub mod products;
pub mod profile;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::middleware::require_auth;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index).post(products::create))
        .route("/products/search", get(products::search))
        .route("/products/{id}", get(products::show))
        .route("/categories", get(products::categories))
        .route("/categories/{id}/products", get(products::by_category))
}

/// Create the authenticated routes router (cart + profile).
///
/// Every route here sits behind the auth gate; rejected requests never
/// reach a handler.
pub fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/cart",
            post(cart::add)
                .get(cart::list)
                .patch(cart::update)
                .delete(cart::remove),
        )
        .route("/profile", get(profile::show).patch(profile::update))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/auth", auth_routes())
        .merge(catalog_routes())
        .merge(protected_routes(&state))
        .layer(cors_layer(state.config()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS layer from the configured origins (any origin when unset).
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.allowed_origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
