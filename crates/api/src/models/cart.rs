//! Cart domain types.

use serde::Serialize;

use bazaar_core::{CartLineId, Cents, ProductId, UserId};

use super::product::Product;

/// One product a user intends to purchase.
///
/// At most one live line exists per (user, product) pair; repeat adds merge
/// into the existing line instead of creating another row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLine {
    /// Unique line ID.
    pub id: CartLineId,
    /// Owning user.
    pub user_id: UserId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Number of units, always >= 1.
    pub quantity: i64,
    /// Price of one unit at the time it was last added.
    pub unit_price: Cents,
    /// Total charge for the line.
    pub final_price: Cents,
}

/// A cart line joined with its product reference, as returned by listing.
#[derive(Debug, Clone, Serialize)]
pub struct CartEntry {
    /// The cart line itself.
    #[serde(flatten)]
    pub line: CartLine,
    /// The referenced catalog product.
    pub product: Product,
}
