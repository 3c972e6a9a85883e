//! Checkout route handlers: order placement and payment confirmation.
//!
//! Placement snapshots the *remote* cart replica (the durable copy), never
//! the session copy: the session was synced on every edit and reconciled
//! at sign-in, and the remote copy is the one that survives a device
//! switch mid-checkout.
//!
//! Nothing monetary is trusted from the client. The subtotal is re-derived
//! from catalog prices, the shipping cost from the zone table, and the
//! discount from coupon state - all at placement time.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use validator::Validate;

use tamarind_core::{Cart, CouponError, OrderId, OrderTotals, PaymentMethod, TotalsError};

use crate::db::coupons::CouponRepository;
use crate::db::orders::{OrderRepository, PlaceOrder};
use crate::db::products::ProductRepository;
use crate::db::shipping::ShippingRepository;
use crate::db::users::UserRepository;
use crate::db::settings::payment_settings;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::payments::{CheckoutLineItem, PaymentStatus};
use crate::services::cart::save_session_cart;
use crate::services::checkout::price_cart;
use crate::state::AppState;

/// Checkout form payload.
#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 2, message = "name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 7, message = "phone must be at least 7 digits"))]
    pub phone: String,
    #[validate(length(min = 5, message = "address must be at least 5 characters"))]
    pub address: String,
    #[validate(length(min = 2, message = "city must be at least 2 characters"))]
    pub city: String,
    #[validate(length(min = 2, message = "region must be at least 2 characters"))]
    pub region: String,
    #[validate(length(min = 3, message = "postal code must be at least 3 characters"))]
    pub postal_code: String,
    #[validate(length(min = 2, message = "country must be at least 2 characters"))]
    pub country: String,
    /// Billing address when it differs from the shipping address.
    pub billing_address: Option<String>,
    pub payment_method: PaymentMethod,
    pub coupon_code: Option<String>,
}

impl CheckoutRequest {
    fn shipping_address(&self) -> String {
        format!(
            "{}\n{}\n{}, {} {}\n{}\nPhone: {}",
            self.name, self.address, self.city, self.region, self.postal_code, self.country,
            self.phone
        )
    }
}

/// Placement response. `checkout_url` is present for card payments and is
/// where the shopper must be sent next.
#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    pub success: bool,
    pub order_id: OrderId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
}

/// Confirmation response.
#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub success: bool,
    pub order_id: OrderId,
}

/// Confirmation query string.
#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    pub session_id: String,
}

/// Place an order from the remote cart snapshot.
#[instrument(skip(state, session, req), fields(user_id = %user.id))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<PlaceOrderResponse>> {
    req.validate()?;

    let settings = payment_settings(state.pool()).await?;
    if !settings.accepts(req.payment_method) {
        return Err(AppError::Validation(HashMap::from([(
            "payment_method".to_string(),
            vec![format!("{} payments are not accepted", req.payment_method)],
        )])));
    }

    let users = UserRepository::new(state.pool());
    let cart = users.get_cart(user.id).await?;
    if cart.is_empty() {
        return Err(AppError::EmptyCart);
    }

    // Server-derived pricing: catalog rows are the only price source.
    let product_ids: Vec<_> = cart.lines().iter().map(|l| l.id).collect();
    let products = ProductRepository::new(state.pool())
        .get_by_ids(&product_ids)
        .await?;
    let priced = price_cart(&cart, &products)?;

    let shipping_cost = ShippingRepository::new(state.pool())
        .rate_for_region(&req.region)
        .await?
        .unwrap_or(state.config().shipping_flat_rate);

    // Re-validate the coupon against the re-derived subtotal; the discount
    // the shopper previewed is never taken at face value.
    let (coupon_id, coupon_code, discount) = match &req.coupon_code {
        Some(code) => {
            let coupon = CouponRepository::new(state.pool())
                .find_by_code(code)
                .await?
                .ok_or_else(|| CouponError::Invalid("unknown coupon code".to_owned()))?;
            let discount = coupon.validate(priced.subtotal, Utc::now())?;
            (Some(coupon.id), Some(coupon.code), discount)
        }
        None => (None, None, rust_decimal::Decimal::ZERO),
    };

    let totals = OrderTotals::compute(priced.subtotal, shipping_cost, discount)
        .map_err(totals_to_validation)?;

    let shipping_address = req.shipping_address();
    let billing_address = req
        .billing_address
        .clone()
        .unwrap_or_else(|| shipping_address.clone());

    let orders = OrderRepository::new(state.pool());
    let order_id = orders
        .place(&PlaceOrder {
            user_id: user.id,
            email: req.email.clone(),
            payment_method: req.payment_method,
            totals,
            shipping_address,
            billing_address,
            coupon: coupon_id,
            coupon_code,
            items: priced.items.clone(),
        })
        .await?;

    if req.payment_method.is_offline() {
        // The transaction cleared the remote replica; mirror it locally.
        if let Err(e) = save_session_cart(&session, &Cart::new()).await {
            tracing::warn!(order_id = %order_id, "session cart clear failed: {e}");
        }

        tracing::info!(order_id = %order_id, method = %req.payment_method, "order placed");
        return Ok(Json(PlaceOrderResponse {
            success: true,
            order_id,
            checkout_url: None,
        }));
    }

    // Card payment: hand off to the provider's hosted checkout. The cart
    // stays untouched until confirmation succeeds.
    let line_items = checkout_line_items(&cart, &priced.items);
    let checkout_session = state
        .stripe()
        .create_checkout_session(
            order_id,
            user.id,
            &req.email,
            &line_items,
            &state.config().checkout_success_url(),
            &state.config().checkout_cancel_url(),
        )
        .await?;

    orders
        .set_checkout_session(order_id, &checkout_session.id)
        .await?;

    tracing::info!(order_id = %order_id, session = %checkout_session.id, "card checkout started");
    Ok(Json(PlaceOrderResponse {
        success: true,
        order_id,
        checkout_url: checkout_session.url,
    }))
}

/// Confirm a card payment after the provider redirects back.
///
/// Authentication is deliberately not required here: the session id is the
/// credential, and the order/user pair comes from the session's metadata,
/// which only sessions we created carry. A paid session without that
/// metadata is refused.
#[instrument(skip(state, session))]
pub async fn confirm_payment(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<ConfirmResponse>> {
    let checkout_session = state.stripe().retrieve_session(&query.session_id).await?;

    if checkout_session.payment_status != PaymentStatus::Paid {
        return Err(AppError::VerificationIncomplete(
            "payment has not completed".to_owned(),
        ));
    }

    let Some((order_id, user_id)) = checkout_session.order_metadata() else {
        return Err(AppError::VerificationIncomplete(
            "session is missing order metadata".to_owned(),
        ));
    };

    let (fee, payout) = checkout_session
        .balance_transaction()
        .map_or((None, None), |tx| {
            (Some(tx.fee_decimal()), Some(tx.net_decimal()))
        });

    let orders = OrderRepository::new(state.pool());
    orders
        .mark_paid(
            order_id,
            user_id,
            &checkout_session.id,
            fee,
            payout,
            Utc::now(),
        )
        .await
        .map_err(|e| match e {
            // Metadata that doesn't match any order is treated the same as
            // missing metadata: the payment is real but unverifiable.
            crate::db::RepositoryError::NotFound => AppError::VerificationIncomplete(
                "session metadata does not match an order".to_owned(),
            ),
            other => AppError::Database(other),
        })?;

    // Cart clearing is best-effort after the order is marked paid: a
    // failure here leaves a stale cart, not a wrong order.
    let users = UserRepository::new(state.pool());
    if let Err(e) = users.clear_cart(user_id).await {
        tracing::warn!(order_id = %order_id, "remote cart clear failed: {e}");
    }
    if let Err(e) = save_session_cart(&session, &Cart::new()).await {
        tracing::warn!(order_id = %order_id, "session cart clear failed: {e}");
    }

    tracing::info!(order_id = %order_id, "payment confirmed");
    Ok(Json(ConfirmResponse {
        success: true,
        order_id,
    }))
}

/// Cancelled checkout: the order stays `pending` and the cart is intact.
#[instrument]
pub async fn cancel_payment() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": false,
        "message": "Payment was cancelled. Your cart is unchanged.",
    }))
}

/// Build provider line items from the cart (names) and the priced order
/// lines (authoritative amounts).
fn checkout_line_items(
    cart: &Cart,
    items: &[crate::models::NewOrderItem],
) -> Vec<CheckoutLineItem> {
    items
        .iter()
        .map(|item| {
            let name = cart
                .lines()
                .iter()
                .find(|l| l.id == item.product_id)
                .map_or_else(|| format!("Product {}", item.product_id), |l| l.name.clone());
            CheckoutLineItem {
                name,
                unit_amount: item.price,
                quantity: u32::try_from(item.quantity).unwrap_or(1),
            }
        })
        .collect()
}

fn totals_to_validation(e: TotalsError) -> AppError {
    AppError::Validation(HashMap::from([(
        "total".to_string(),
        vec![e.to_string()],
    )]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use tamarind_core::{CartLine, ProductId};

    use super::*;
    use crate::models::NewOrderItem;

    fn valid_request() -> CheckoutRequest {
        CheckoutRequest {
            name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: "5550100123".to_owned(),
            address: "12 Analytical Engine Way".to_owned(),
            city: "London".to_owned(),
            region: "Greater London".to_owned(),
            postal_code: "EC1A".to_owned(),
            country: "UK".to_owned(),
            billing_address: None,
            payment_method: PaymentMethod::Cod,
            coupon_code: None,
        }
    }

    #[test]
    fn valid_request_passes_validation() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn short_fields_fail_per_field() {
        let mut req = valid_request();
        req.name = "A".to_owned();
        req.phone = "123".to_owned();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("phone"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn bad_email_fails_validation() {
        let mut req = valid_request();
        req.email = "not-an-email".to_owned();
        assert!(req.validate().is_err());
    }

    #[test]
    fn shipping_address_carries_all_fields() {
        let rendered = valid_request().shipping_address();
        for part in [
            "Ada Lovelace",
            "12 Analytical Engine Way",
            "London",
            "Greater London",
            "EC1A",
            "UK",
            "5550100123",
        ] {
            assert!(rendered.contains(part), "missing {part} in {rendered}");
        }
    }

    #[test]
    fn line_items_take_names_from_cart_and_amounts_from_pricing() {
        let mut cart = Cart::new();
        cart.add_line(
            CartLine {
                id: ProductId::new(1),
                name: "Copper Kettle".to_owned(),
                // Stale snapshot price; the priced items below are the truth.
                price: Decimal::ONE,
                image: None,
                slug: "copper-kettle".to_owned(),
                category: None,
                quantity: 2,
            },
            2,
        );

        let items = vec![NewOrderItem {
            product_id: ProductId::new(1),
            quantity: 2,
            price: Decimal::from(35),
        }];

        let line_items = checkout_line_items(&cart, &items);
        assert_eq!(line_items.len(), 1);
        assert_eq!(line_items[0].name, "Copper Kettle");
        assert_eq!(line_items[0].unit_amount, Decimal::from(35));
        assert_eq!(line_items[0].quantity, 2);
    }
}
