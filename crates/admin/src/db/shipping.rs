//! Shipping zone repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use tamarind_core::ShippingZoneId;

use super::RepositoryError;
use crate::models::ShippingZone;

/// Fields for creating or updating a shipping zone.
#[derive(Debug, Clone)]
pub struct ShippingZoneInput {
    pub name: String,
    pub regions: Vec<String>,
    pub rate: Decimal,
    pub active: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct ZoneRow {
    id: i32,
    name: String,
    regions: Vec<String>,
    rate: Decimal,
    active: bool,
}

impl From<ZoneRow> for ShippingZone {
    fn from(r: ZoneRow) -> Self {
        Self {
            id: ShippingZoneId::new(r.id),
            name: r.name,
            regions: r.regions,
            rate: r.rate,
            active: r.active,
        }
    }
}

/// Repository for shipping zone administration.
pub struct ShippingAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShippingAdminRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all zones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ShippingZone>, RepositoryError> {
        let rows: Vec<ZoneRow> = sqlx::query_as(
            "SELECT id, name, regions, rate, active FROM shop.shipping_zone ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ShippingZone::from).collect())
    }

    /// Create a zone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &ShippingZoneInput) -> Result<ShippingZone, RepositoryError> {
        let row: ZoneRow = sqlx::query_as(
            r"
            INSERT INTO shop.shipping_zone (name, regions, rate, active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, regions, rate, active
            ",
        )
        .bind(&input.name)
        .bind(&input.regions)
        .bind(input.rate)
        .bind(input.active)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update a zone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the zone doesn't exist.
    pub async fn update(
        &self,
        id: ShippingZoneId,
        input: &ShippingZoneInput,
    ) -> Result<ShippingZone, RepositoryError> {
        let row: Option<ZoneRow> = sqlx::query_as(
            r"
            UPDATE shop.shipping_zone
            SET name = $1, regions = $2, rate = $3, active = $4
            WHERE id = $5
            RETURNING id, name, regions, rate, active
            ",
        )
        .bind(&input.name)
        .bind(&input.regions)
        .bind(input.rate)
        .bind(input.active)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(ShippingZone::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a zone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the zone doesn't exist.
    pub async fn delete(&self, id: ShippingZoneId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.shipping_zone WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
