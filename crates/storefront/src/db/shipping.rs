//! Shipping zone repository.
//!
//! Zones map address regions to shipping rates. Checkout falls back to the
//! configured flat rate when no active zone matches.

use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;

/// Repository for shipping rate lookups.
pub struct ShippingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShippingRepository<'a> {
    /// Create a new shipping repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Rate of the first active zone covering `region` (case-insensitive),
    /// or `None` when no zone matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn rate_for_region(&self, region: &str) -> Result<Option<Decimal>, RepositoryError> {
        let rate: Option<Decimal> = sqlx::query_scalar(
            r"
            SELECT rate
            FROM shop.shipping_zone
            WHERE active AND $1 ILIKE ANY(regions)
            ORDER BY id
            LIMIT 1
            ",
        )
        .bind(region.trim())
        .fetch_optional(self.pool)
        .await?;

        Ok(rate)
    }
}
