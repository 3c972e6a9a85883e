//! Admin coupon routes.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

use tamarind_core::{Coupon, CouponId, CouponKind, CouponStatus};

use crate::db::coupons::{CouponAdminRepository, CouponInput};
use crate::error::{AdminError, Result};
use crate::middleware::{RequireAdmin, RequireWriter};
use crate::state::AppState;

/// Create/update coupon request.
#[derive(Debug, Deserialize, Validate)]
pub struct CouponRequest {
    #[validate(length(min = 3, max = 32, message = "code must be 3-32 characters"))]
    pub code: String,
    pub kind: CouponKind,
    pub amount: Decimal,
    pub min_spend: Option<Decimal>,
    pub max_spend: Option<Decimal>,
    pub expires_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
    pub status: Option<CouponStatus>,
}

impl CouponRequest {
    fn check_amounts(&self) -> Result<()> {
        let mut fields = std::collections::HashMap::new();
        if self.amount < Decimal::ZERO {
            fields.insert("amount".to_owned(), vec!["must not be negative".to_owned()]);
        }
        if self.kind == CouponKind::Percent && self.amount > Decimal::from(100) {
            fields.insert(
                "amount".to_owned(),
                vec!["percentage cannot exceed 100".to_owned()],
            );
        }
        if self.usage_limit.is_some_and(|l| l < 0) {
            fields.insert(
                "usage_limit".to_owned(),
                vec!["must not be negative".to_owned()],
            );
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(AdminError::Validation(fields))
        }
    }

    fn into_input(self) -> CouponInput {
        CouponInput {
            code: self.code,
            kind: self.kind,
            amount: self.amount,
            min_spend: self.min_spend,
            max_spend: self.max_spend,
            expires_at: self.expires_at,
            usage_limit: self.usage_limit,
            status: self.status.unwrap_or_default(),
        }
    }
}

/// List all coupons.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<Coupon>>> {
    let coupons = CouponAdminRepository::new(state.pool()).list().await?;
    Ok(Json(coupons))
}

/// Create a coupon.
#[instrument(skip(state, req), fields(admin = %admin.0.email))]
pub async fn create(
    State(state): State<AppState>,
    admin: RequireWriter,
    Json(req): Json<CouponRequest>,
) -> Result<Json<Coupon>> {
    req.validate()?;
    req.check_amounts()?;

    let coupon = CouponAdminRepository::new(state.pool())
        .create(&req.into_input())
        .await?;

    tracing::info!(code = %coupon.code, "coupon created");
    Ok(Json(coupon))
}

/// Update a coupon.
#[instrument(skip(state, req), fields(admin = %admin.0.email))]
pub async fn update(
    State(state): State<AppState>,
    admin: RequireWriter,
    Path(id): Path<CouponId>,
    Json(req): Json<CouponRequest>,
) -> Result<Json<Coupon>> {
    req.validate()?;
    req.check_amounts()?;

    let coupon = CouponAdminRepository::new(state.pool())
        .update(id, &req.into_input())
        .await?;

    tracing::info!(code = %coupon.code, "coupon updated");
    Ok(Json(coupon))
}

/// Delete a coupon.
#[instrument(skip(state), fields(admin = %admin.0.email))]
pub async fn remove(
    State(state): State<AppState>,
    admin: RequireWriter,
    Path(id): Path<CouponId>,
) -> Result<Json<serde_json::Value>> {
    CouponAdminRepository::new(state.pool()).delete(id).await?;

    tracing::info!(coupon_id = %id, "coupon deleted");
    Ok(Json(serde_json::json!({ "success": true })))
}
