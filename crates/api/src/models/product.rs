//! Catalog domain types.

use serde::{Deserialize, Serialize};

use bazaar_core::{CategoryId, Cents, ProductId};

/// A catalog product.
///
/// Read-only from the cart's point of view; it supplies the unit price when
/// a cart line is created.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Category this product belongs to.
    pub category_id: CategoryId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// URL of the product image.
    pub image_url: String,
    /// Seller name.
    pub seller: String,
    /// Price of one unit.
    pub price: Cents,
    /// Marketing highlights.
    pub highlights: String,
    /// Technical specifications.
    pub specifications: String,
}

/// A product category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Category name.
    pub name: String,
    /// URL of the category image.
    pub image_url: String,
}

/// Payload for creating a catalog product.
#[derive(Debug, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category_id: CategoryId,
    pub price: Cents,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub seller: String,
    #[serde(default)]
    pub highlights: String,
    #[serde(default)]
    pub specifications: String,
}
