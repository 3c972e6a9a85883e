//! Admin product repository.
//!
//! Products referenced by order items are deactivated on delete instead of
//! removed, so order snapshots keep a valid foreign key.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tamarind_core::ProductId;

use super::{RepositoryError, conflict_on_unique};
use crate::models::AdminProduct;

/// Fields for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub tags: Vec<String>,
    pub active: bool,
}

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
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for AdminProduct {
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
            updated_at: r.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, name, slug, price, image, category, brand, tags, active, created_at, updated_at";

/// The outcome of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The row was removed.
    Deleted,
    /// The product is referenced by order items and was deactivated
    /// instead.
    Deactivated,
}

/// Repository for catalog administration.
pub struct ProductAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductAdminRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products (including inactive), newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<AdminProduct>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(AdminProduct::from).collect())
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug already exists.
    pub async fn create(&self, input: &ProductInput) -> Result<AdminProduct, RepositoryError> {
        let row: ProductRow = sqlx::query_as(&format!(
            r"
            INSERT INTO shop.product (name, slug, price, image, category, brand, tags, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(&input.slug)
        .bind(input.price)
        .bind(&input.image)
        .bind(&input.category)
        .bind(&input.brand)
        .bind(&input.tags)
        .bind(input.active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "product slug already exists"))?;

        Ok(row.into())
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new slug collides.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<AdminProduct, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r"
            UPDATE shop.product
            SET name = $1, slug = $2, price = $3, image = $4, category = $5,
                brand = $6, tags = $7, active = $8, updated_at = NOW()
            WHERE id = $9
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(&input.slug)
        .bind(input.price)
        .bind(&input.image)
        .bind(&input.category)
        .bind(&input.brand)
        .bind(&input.tags)
        .bind(input.active)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "product slug already exists"))?;

        row.map(AdminProduct::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a product, or deactivate it when order items reference it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<DeleteOutcome, RepositoryError> {
        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM shop.order_item WHERE product_id = $1)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        if referenced {
            let result = sqlx::query(
                "UPDATE shop.product SET active = FALSE, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .execute(self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }
            return Ok(DeleteOutcome::Deactivated);
        }

        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(DeleteOutcome::Deleted)
    }
}
