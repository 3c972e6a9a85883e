//! Product repository.
//!
//! Read-only catalog access for the storefront. The admin crate owns
//! catalog writes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tamarind_core::ProductId;

use super::RepositoryError;
use crate::models::Product;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    slug: String,
    price: Decimal,
    image: Option<String>,
    category: Option<String>,
    brand: Option<String>,
    tags: Vec<String>,
    active: bool,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            id: ProductId::new(r.id),
            name: r.name,
            slug: r.slug,
            price: r.price,
            image: r.image,
            category: r.category,
            brand: r.brand,
            tags: r.tags,
            active: r.active,
            created_at: r.created_at,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, name, slug, price, image, category, brand, tags, active, created_at";

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE active ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get an active product by its URL slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE slug = $1 AND active"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Fetch products by id, active or not.
    ///
    /// Used by checkout to re-derive prices for a cart snapshot; the caller
    /// decides what a missing or inactive product means.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(|id| id.get()).collect();

        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = ANY($1)"
        ))
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
