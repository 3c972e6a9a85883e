//! Order models.
//!
//! An [`Order`] is a persisted, priced checkout attempt; its
//! [`OrderItem`]s are immutable snapshots of the cart lines at placement
//! time. Orders are never deleted, only moved to the `archived` status.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tamarind_core::{OrderId, OrderItemId, OrderStatus, PaymentMethod, ProductId, UserId};

/// A placed order.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub email: String,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub shipping_address: String,
    pub billing_address: String,
    pub coupon_code: Option<String>,
    /// Provider checkout session, set when a card payment was started.
    pub stripe_session_id: Option<String>,
    /// Provider fee in the store currency, set after confirmation.
    pub stripe_fee: Option<Decimal>,
    /// Net payout after fees, set after confirmation.
    pub stripe_payout: Option<Decimal>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// One snapshot line of an order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    /// Unit price at the moment of purchase.
    pub price: Decimal,
}

/// A new order line, before insertion.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

/// Listing row for order history.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}
