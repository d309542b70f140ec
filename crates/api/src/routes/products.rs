//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::{CategoryId, ProductId};

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::product::{Category, NewProduct, Product};
use crate::state::AppState;

/// Query parameters for product search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

/// List the whole catalog.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool(), state.config().storage_timeout);
    Ok(Json(products.list().await?))
}

/// Get one product by ID.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let products = ProductRepository::new(state.pool(), state.config().storage_timeout);
    let product = products
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))?;

    Ok(Json(product))
}

/// Search products by product or category name.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool(), state.config().storage_timeout);
    Ok(Json(products.search(&params.query).await?))
}

/// Create a catalog product.
#[instrument(skip(state, req))]
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_owned()));
    }
    if !req.price.is_non_negative() {
        return Err(AppError::BadRequest("price must not be negative".to_owned()));
    }

    let products = ProductRepository::new(state.pool(), state.config().storage_timeout);
    let product = products.create(&req).await?;

    tracing::info!(product_id = %product.id, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// List every category.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let products = ProductRepository::new(state.pool(), state.config().storage_timeout);
    Ok(Json(products.categories().await?))
}

/// List the products of one category.
#[instrument(skip(state))]
pub async fn by_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool(), state.config().storage_timeout);
    Ok(Json(products.list_by_category(id).await?))
}
