//! Cart repository.
//!
//! The cart-line table is the only shared mutable state in the service, and
//! this repository is its single owner. Every mutation for a given
//! (user, product) key is one atomic statement - a conditional upsert, an
//! `UPDATE .. RETURNING`, or a `DELETE` judged by its affected-row count -
//! so concurrent requests for the same key serialize inside the storage
//! engine and never race an application-level read against a write.

use std::time::Duration;

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use bazaar_core::{Cents, ProductId, UserId};

use super::{RepositoryError, with_timeout};
use crate::models::cart::{CartEntry, CartLine};
use crate::models::product::Product;

/// Repository for cart-line operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
    timeout: Duration,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository with the request's storage timeout.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Add one unit of a product to a user's cart, merging into the existing
    /// line if there is one.
    ///
    /// First add creates the line with quantity 1 and
    /// `final_price = unit_price`. A repeat add increments the quantity and
    /// recomputes `final_price = quantity * unit_price` from the unit price
    /// supplied with this call, not the stored one. The whole
    /// check-create-or-update runs as a single conditional upsert, so two
    /// concurrent adds cannot both observe an empty slot or lose an
    /// increment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Timeout` when the storage call exceeds its
    /// budget, or `RepositoryError::Database` on any other storage failure.
    pub async fn add_or_merge(
        &self,
        user_id: UserId,
        product_id: ProductId,
        unit_price: Cents,
    ) -> Result<CartLine, RepositoryError> {
        let line = with_timeout(
            self.timeout,
            sqlx::query_as::<_, CartLine>(
                r"
                INSERT INTO cart_lines (user_id, product_id, quantity, unit_price, final_price)
                VALUES ($1, $2, 1, $3, $3)
                ON CONFLICT (user_id, product_id) DO UPDATE SET
                    quantity = cart_lines.quantity + 1,
                    unit_price = excluded.unit_price,
                    final_price = (cart_lines.quantity + 1) * excluded.unit_price
                RETURNING id, user_id, product_id, quantity, unit_price, final_price
                ",
            )
            .bind(user_id)
            .bind(product_id)
            .bind(unit_price)
            .fetch_one(self.pool),
        )
        .await?;

        Ok(line)
    }

    /// List every live line for a user, joined with its product, in storage
    /// order.
    ///
    /// Returns an empty vector (not an error) when the user has no lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Timeout` or `RepositoryError::Database` on
    /// storage failure.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartEntry>, RepositoryError> {
        let rows = with_timeout(
            self.timeout,
            sqlx::query(
                r"
                SELECT cl.id AS line_id, cl.user_id, cl.product_id, cl.quantity,
                       cl.unit_price, cl.final_price,
                       p.id, p.category_id, p.name, p.description, p.image_url,
                       p.seller, p.price, p.highlights, p.specifications
                FROM cart_lines cl
                JOIN products p ON p.id = cl.product_id
                WHERE cl.user_id = $1
                ORDER BY cl.id
                ",
            )
            .bind(user_id)
            .fetch_all(self.pool),
        )
        .await?;

        rows.iter().map(entry_from_row).collect()
    }

    /// Overwrite the quantity and final price of an existing line with
    /// caller-supplied values. No recomputation is performed.
    ///
    /// Absence is detected from the statement's own result (`RETURNING`
    /// produced no row), never from a prior existence check.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when no line matches the
    /// (user, product) pair.
    pub async fn update(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
        final_price: Cents,
    ) -> Result<CartLine, RepositoryError> {
        let line = with_timeout(
            self.timeout,
            sqlx::query_as::<_, CartLine>(
                r"
                UPDATE cart_lines
                SET quantity = $3, final_price = $4
                WHERE user_id = $1 AND product_id = $2
                RETURNING id, user_id, product_id, quantity, unit_price, final_price
                ",
            )
            .bind(user_id)
            .bind(product_id)
            .bind(quantity)
            .bind(final_price)
            .fetch_optional(self.pool),
        )
        .await?;

        line.ok_or(RepositoryError::NotFound)
    }

    /// Remove the line for a (user, product) pair.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when no line matched, detected
    /// via the affected-row count.
    pub async fn delete(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let result = with_timeout(
            self.timeout,
            sqlx::query(
                r"
                DELETE FROM cart_lines
                WHERE user_id = $1 AND product_id = $2
                ",
            )
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

/// Map one joined row onto a line + product pair.
fn entry_from_row(row: &SqliteRow) -> Result<CartEntry, RepositoryError> {
    let line = CartLine {
        id: row.try_get("line_id")?,
        user_id: row.try_get("user_id")?,
        product_id: row.try_get("product_id")?,
        quantity: row.try_get("quantity")?,
        unit_price: row.try_get("unit_price")?,
        final_price: row.try_get("final_price")?,
    };

    let product = Product {
        id: row.try_get("id")?,
        category_id: row.try_get("category_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        image_url: row.try_get("image_url")?,
        seller: row.try_get("seller")?,
        price: row.try_get("price")?,
        highlights: row.try_get("highlights")?,
        specifications: row.try_get("specifications")?,
    };

    Ok(CartEntry { line, product })
}
