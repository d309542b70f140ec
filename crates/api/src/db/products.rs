//! Catalog repository.

use std::time::Duration;

use sqlx::SqlitePool;

use bazaar_core::{CategoryId, ProductId};

use super::{RepositoryError, with_timeout};
use crate::models::product::{Category, NewProduct, Product};

const PRODUCT_COLUMNS: &str =
    "id, category_id, name, description, image_url, seller, price, highlights, specifications";

/// Repository for catalog reads and product creation.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
    timeout: Duration,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository with the request's storage timeout.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Timeout` or `RepositoryError::Database` on
    /// storage failure.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = with_timeout(
            self.timeout,
            sqlx::query_as::<_, Product>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(self.pool),
        )
        .await?;

        Ok(product)
    }

    /// List the whole catalog in storage order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Timeout` or `RepositoryError::Database` on
    /// storage failure.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = with_timeout(
            self.timeout,
            sqlx::query_as::<_, Product>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
            ))
            .fetch_all(self.pool),
        )
        .await?;

        Ok(products)
    }

    /// List the products of one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Timeout` or `RepositoryError::Database` on
    /// storage failure.
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = with_timeout(
            self.timeout,
            sqlx::query_as::<_, Product>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE category_id = $1 ORDER BY id"
            ))
            .bind(category_id)
            .fetch_all(self.pool),
        )
        .await?;

        Ok(products)
    }

    /// Search products by product or category name.
    ///
    /// Matching ignores case and spaces, so "blue tooth" finds "Bluetooth".
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Timeout` or `RepositoryError::Database` on
    /// storage failure.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, RepositoryError> {
        let needle = format!("%{}%", query.to_lowercase().replace(' ', ""));

        let products = with_timeout(
            self.timeout,
            sqlx::query_as::<_, Product>(
                r"
                SELECT p.id, p.category_id, p.name, p.description, p.image_url,
                       p.seller, p.price, p.highlights, p.specifications
                FROM products p
                JOIN categories c ON p.category_id = c.id
                WHERE REPLACE(LOWER(c.name), ' ', '') LIKE $1
                   OR REPLACE(LOWER(p.name), ' ', '') LIKE $1
                ORDER BY p.id
                ",
            )
            .bind(needle)
            .fetch_all(self.pool),
        )
        .await?;

        Ok(products)
    }

    /// Create a catalog product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the category does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let product = with_timeout(
            self.timeout,
            sqlx::query_as::<_, Product>(&format!(
                r"
                INSERT INTO products
                    (category_id, name, description, image_url, seller, price,
                     highlights, specifications)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {PRODUCT_COLUMNS}
                "
            ))
            .bind(new.category_id)
            .bind(&new.name)
            .bind(&new.description)
            .bind(&new.image_url)
            .bind(&new.seller)
            .bind(new.price)
            .bind(&new.highlights)
            .bind(&new.specifications)
            .fetch_one(self.pool),
        )
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                return RepositoryError::Conflict("category does not exist".to_owned());
            }
            e
        })?;

        Ok(product)
    }

    /// List every category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Timeout` or `RepositoryError::Database` on
    /// storage failure.
    pub async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = with_timeout(
            self.timeout,
            sqlx::query_as::<_, Category>("SELECT id, name, image_url FROM categories ORDER BY id")
                .fetch_all(self.pool),
        )
        .await?;

        Ok(categories)
    }
}

/// Whether an error is a foreign-key violation.
fn is_foreign_key_violation(err: &RepositoryError) -> bool {
    matches!(
        err,
        RepositoryError::Database(sqlx::Error::Database(db_err))
            if db_err.is_foreign_key_violation()
    )
}
