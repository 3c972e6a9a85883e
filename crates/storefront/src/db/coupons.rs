//! Coupon repository.
//!
//! Lookup only. The bounded usage increment happens inside the order
//! placement transaction (`orders::OrderRepository::place`), never here:
//! validating a code must not consume it.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tamarind_core::{Coupon, CouponId, CouponKind, CouponStatus};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CouponRow {
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
    pub(crate) fn into_coupon(self) -> Result<Coupon, RepositoryError> {
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

pub(crate) const COUPON_COLUMNS: &str =
    "id, code, kind, amount, min_spend, max_spend, expires_at, usage_limit, usage_count, status";

/// Repository for coupon lookups.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find a coupon by its code.
    ///
    /// The code is normalized (trimmed, upper-cased) before lookup, so
    /// `save10` finds `SAVE10`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row's enums no
    /// longer parse.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, RepositoryError> {
        let normalized = Coupon::normalize_code(code);

        let row: Option<CouponRow> = sqlx::query_as(&format!(
            "SELECT {COUPON_COLUMNS} FROM shop.coupon WHERE code = $1"
        ))
        .bind(&normalized)
        .fetch_optional(self.pool)
        .await?;

        row.map(CouponRow::into_coupon).transpose()
    }
}
