//! Domain models for the admin API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tamarind_core::{
    AdminRole, AdminUserId, OrderId, OrderItemId, OrderStatus, PaymentMethod, ProductId, UserId,
};

/// An admin account.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
}

/// Session-stored admin identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: AdminUserId,
    pub email: String,
    pub role: AdminRole,
}

/// Session keys.
pub mod session_keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

/// An order as the admin sees it.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrder {
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
    pub stripe_session_id: Option<String>,
    pub stripe_fee: Option<Decimal>,
    pub stripe_payout: Option<Decimal>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<AdminOrderItem>,
}

/// One snapshot line of an order.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

/// Listing row for the orders table.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrderSummary {
    pub id: OrderId,
    pub email: String,
    pub status: OrderStatus,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

/// A catalog product with admin-only fields visible.
#[derive(Debug, Clone, Serialize)]
pub struct AdminProduct {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub tags: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A shipping zone.
#[derive(Debug, Clone, Serialize)]
pub struct ShippingZone {
    pub id: tamarind_core::ShippingZoneId,
    pub name: String,
    pub regions: Vec<String>,
    pub rate: Decimal,
    pub active: bool,
}
