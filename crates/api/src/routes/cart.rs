//! Cart route handlers.
//!
//! Thin adapters: decode the body, resolve the caller from the auth gate's
//! extension, dispatch to the cart repository, and shape the response. No
//! pricing or merge logic lives here.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::{Cents, ProductId};

use crate::db::RepositoryError;
use crate::db::cart::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::cart::{CartEntry, CartLine};
use crate::state::AppState;

/// Add-to-cart request body.
///
/// The unit price is sourced from the catalog at add time; a client-supplied
/// `unit_price` field is accepted for compatibility but ignored.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub unit_price: Option<Cents>,
}

/// Cart update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub quantity: i64,
    pub final_price: Cents,
}

/// Cart delete request body.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

/// Add one unit of a product to the caller's cart, merging into the
/// existing line for that product if there is one.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartLine>)> {
    let timeout = state.config().storage_timeout;

    let products = ProductRepository::new(state.pool(), timeout);
    let product = products
        .get(req.product_id)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("unknown product {}", req.product_id)))?;

    let cart = CartRepository::new(state.pool(), timeout);
    let line = cart
        .add_or_merge(user_id, req.product_id, product.price)
        .await?;

    Ok((StatusCode::CREATED, Json(line)))
}

/// List the caller's cart lines with their products.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<CartEntry>>> {
    let cart = CartRepository::new(state.pool(), state.config().storage_timeout);
    let entries = cart.list(user_id).await?;

    Ok(Json(entries))
}

/// Overwrite a line's quantity and final price with caller-supplied values.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<UpdateCartRequest>,
) -> Result<(StatusCode, Json<&'static str>)> {
    if req.quantity < 1 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_owned()));
    }
    if !req.final_price.is_non_negative() {
        return Err(AppError::BadRequest("final_price must not be negative".to_owned()));
    }

    let cart = CartRepository::new(state.pool(), state.config().storage_timeout);
    cart.update(user_id, req.product_id, req.quantity, req.final_price)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound(format!("no cart line for product {}", req.product_id))
            }
            other => AppError::Database(other),
        })?;

    Ok((StatusCode::ACCEPTED, Json("Success")))
}

/// Remove a line from the caller's cart.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<RemoveFromCartRequest>,
) -> Result<Json<&'static str>> {
    let cart = CartRepository::new(state.pool(), state.config().storage_timeout);
    cart.delete(user_id, req.product_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound(format!("no cart line for product {}", req.product_id))
            }
            other => AppError::Database(other),
        })?;

    Ok(Json("Deleted"))
}
