//! Coupon preview route.
//!
//! Validates a code against the shopper's current cart and returns the
//! discount it would grant. Preview never touches the usage counter; the
//! bounded increment happens only when an order using the coupon is
//! placed.

use axum::{Json, extract::State};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use tamarind_core::CouponError;

use crate::db::coupons::CouponRepository;
use crate::db::products::ProductRepository;
use crate::error::Result;
use crate::services::cart::session_cart;
use crate::services::checkout::price_cart;
use crate::state::AppState;

/// Coupon validation request.
#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    pub code: String,
}

/// Coupon validation response.
#[derive(Debug, Serialize)]
pub struct ValidateCouponResponse {
    pub success: bool,
    pub code: String,
    pub discount: Decimal,
    pub subtotal: Decimal,
}

/// Validate a coupon code against the current cart.
#[instrument(skip(state, session))]
pub async fn validate(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<ValidateCouponRequest>,
) -> Result<Json<ValidateCouponResponse>> {
    let cart = session_cart(&session).await;

    // Price the preview the same way placement will: from the catalog.
    let product_ids: Vec<_> = cart.lines().iter().map(|l| l.id).collect();
    let products = ProductRepository::new(state.pool())
        .get_by_ids(&product_ids)
        .await?;
    let priced = price_cart(&cart, &products)?;

    let coupon = CouponRepository::new(state.pool())
        .find_by_code(&req.code)
        .await?
        .ok_or_else(|| CouponError::Invalid("unknown coupon code".to_owned()))?;

    let discount = coupon.validate(priced.subtotal, Utc::now())?;

    Ok(Json(ValidateCouponResponse {
        success: true,
        code: coupon.code,
        discount,
        subtotal: priced.subtotal,
    }))
}
