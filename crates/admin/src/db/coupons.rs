//! Admin coupon repository.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tamarind_core::{Coupon, CouponId, CouponKind, CouponStatus};

use super::{RepositoryError, conflict_on_unique};

/// Fields for creating or updating a coupon.
#[derive(Debug, Clone)]
pub struct CouponInput {
    pub code: String,
    pub kind: CouponKind,
    pub amount: Decimal,
    pub min_spend: Option<Decimal>,
    pub max_spend: Option<Decimal>,
    pub expires_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
    pub status: CouponStatus,
}

#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    id: i32,
    code: String,
    kind: String,
    amount: Decimal,
    min_spend: Option<Decimal>,
    max_spend: Option<Decimal>,
    expires_at: Option<DateTime<Utc>>,
    usage_limit: Option<i32>,
    usage_count: i32,
    status: String,
}

impl CouponRow {
    fn into_coupon(self) -> Result<Coupon, RepositoryError> {
        let kind = CouponKind::from_str(&self.kind)
            .map_err(|e| RepositoryError::DataCorruption(format!("coupon {}: {e}", self.id)))?;
        let status = CouponStatus::from_str(&self.status)
            .map_err(|e| RepositoryError::DataCorruption(format!("coupon {}: {e}", self.id)))?;

        Ok(Coupon {
            id: CouponId::new(self.id),
            code: self.code,
            kind,
            amount: self.amount,
            min_spend: self.min_spend,
            max_spend: self.max_spend,
            expires_at: self.expires_at,
            usage_limit: self.usage_limit,
            usage_count: self.usage_count,
            status,
        })
    }
}

const COUPON_COLUMNS: &str =
    "id, code, kind, amount, min_spend, max_spend, expires_at, usage_limit, usage_count, status";

/// Repository for coupon administration.
pub struct CouponAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponAdminRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all coupons, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Coupon>, RepositoryError> {
        let rows: Vec<CouponRow> = sqlx::query_as(&format!(
            "SELECT {COUPON_COLUMNS} FROM shop.coupon ORDER BY id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CouponRow::into_coupon).collect()
    }

    /// Create a coupon. The code is stored upper-cased.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code already exists.
    pub async fn create(&self, input: &CouponInput) -> Result<Coupon, RepositoryError> {
        let row: CouponRow = sqlx::query_as(&format!(
            r"
            INSERT INTO shop.coupon
                (code, kind, amount, min_spend, max_spend, expires_at, usage_limit, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COUPON_COLUMNS}
            "
        ))
        .bind(Coupon::normalize_code(&input.code))
        .bind(input.kind.to_string())
        .bind(input.amount)
        .bind(input.min_spend)
        .bind(input.max_spend)
        .bind(input.expires_at)
        .bind(input.usage_limit)
        .bind(input.status.to_string())
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "coupon code already exists"))?;

        row.into_coupon()
    }

    /// Update a coupon. The usage counter is not touched here.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new code collides.
    pub async fn update(
        &self,
        id: CouponId,
        input: &CouponInput,
    ) -> Result<Coupon, RepositoryError> {
        let row: Option<CouponRow> = sqlx::query_as(&format!(
            r"
            UPDATE shop.coupon
            SET code = $1, kind = $2, amount = $3, min_spend = $4, max_spend = $5,
                expires_at = $6, usage_limit = $7, status = $8
            WHERE id = $9
            RETURNING {COUPON_COLUMNS}
            "
        ))
        .bind(Coupon::normalize_code(&input.code))
        .bind(input.kind.to_string())
        .bind(input.amount)
        .bind(input.min_spend)
        .bind(input.max_spend)
        .bind(input.expires_at)
        .bind(input.usage_limit)
        .bind(input.status.to_string())
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "coupon code already exists"))?;

        row.ok_or(RepositoryError::NotFound)?.into_coupon()
    }

    /// Delete a coupon.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon doesn't exist.
    pub async fn delete(&self, id: CouponId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.coupon WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
