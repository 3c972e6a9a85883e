//! Order repository.
//!
//! Order placement is all-or-nothing: the order row, its item snapshots,
//! the coupon usage increment, and (for offline payment methods) the remote
//! cart clear all execute inside one transaction. A failure at any step
//! rolls the whole placement back; an order can never exist without its
//! items.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tamarind_core::{
    CouponId, OrderId, OrderItemId, OrderStatus, OrderTotals, PaymentMethod, ProductId, UserId,
};

use super::RepositoryError;
use crate::models::{NewOrderItem, Order, OrderItem, OrderSummary};

/// Errors from the placement transaction, split by failing step so the
/// checkout route can tell the shopper which write failed.
#[derive(Debug, thiserror::Error)]
pub enum PlaceOrderError {
    /// The order row insert failed.
    #[error("failed to create order: {0}")]
    OrderInsert(sqlx::Error),

    /// An order item insert failed.
    #[error("failed to create order items: {0}")]
    ItemsInsert(sqlx::Error),

    /// The coupon's usage limit was hit by a concurrent redemption.
    #[error("coupon usage limit reached")]
    CouponExhausted,

    /// Transaction plumbing or the cart clear failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Everything needed to place an order.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub user_id: UserId,
    pub email: String,
    pub payment_method: PaymentMethod,
    pub totals: OrderTotals,
    pub shipping_address: String,
    pub billing_address: String,
    /// Coupon to redeem atomically with the placement, if one was applied.
    pub coupon: Option<CouponId>,
    pub coupon_code: Option<String>,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    email: String,
    status: String,
    subtotal: Decimal,
    discount: Decimal,
    shipping_cost: Decimal,
    total: Decimal,
    payment_method: String,
    shipping_address: String,
    billing_address: String,
    coupon_code: Option<String>,
    stripe_session_id: Option<String>,
    stripe_fee: Option<Decimal>,
    stripe_payout: Option<Decimal>,
    paid_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let status = OrderStatus::from_str(&self.status)
            .map_err(|e| RepositoryError::DataCorruption(format!("order {}: {e}", self.id)))?;
        let payment_method = PaymentMethod::from_str(&self.payment_method)
            .map_err(|e| RepositoryError::DataCorruption(format!("order {}: {e}", self.id)))?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            email: self.email,
            status,
            subtotal: self.subtotal,
            discount: self.discount,
            shipping_cost: self.shipping_cost,
            total: self.total,
            payment_method,
            shipping_address: self.shipping_address,
            billing_address: self.billing_address,
            coupon_code: self.coupon_code,
            stripe_session_id: self.stripe_session_id,
            stripe_fee: self.stripe_fee,
            stripe_payout: self.stripe_payout,
            paid_at: self.paid_at,
            created_at: self.created_at,
            items,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    price: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(r: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(r.id),
            order_id: OrderId::new(r.order_id),
            product_id: ProductId::new(r.product_id),
            quantity: r.quantity,
            price: r.price,
        }
    }
}

const ORDER_COLUMNS: &str = "id, user_id, email, status, subtotal, discount, shipping_cost, \
     total, payment_method, shipping_address, billing_address, coupon_code, \
     stripe_session_id, stripe_fee, stripe_payout, paid_at, created_at";

/// Repository for order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order: insert the order row and its items, redeem the
    /// coupon, and (for offline payment methods) clear the remote cart,
    /// all in one transaction.
    ///
    /// The order is created in `pending` status; offline methods are
    /// finalized by the caller's flow, card payments by confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`PlaceOrderError`] naming the failing step. Any error
    /// leaves the database untouched.
    pub async fn place(&self, order: &PlaceOrder) -> Result<OrderId, PlaceOrderError> {
        let mut tx = self.pool.begin().await?;

        let order_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO shop.order
                (user_id, email, status, subtotal, discount, shipping_cost, total,
                 payment_method, shipping_address, billing_address, coupon_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            ",
        )
        .bind(order.user_id)
        .bind(&order.email)
        .bind(OrderStatus::Pending.to_string())
        .bind(order.totals.subtotal)
        .bind(order.totals.discount)
        .bind(order.totals.shipping_cost)
        .bind(order.totals.total)
        .bind(order.payment_method.to_string())
        .bind(&order.shipping_address)
        .bind(&order.billing_address)
        .bind(order.coupon_code.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(PlaceOrderError::OrderInsert)?;

        for item in &order.items {
            sqlx::query(
                r"
                INSERT INTO shop.order_item (order_id, product_id, quantity, price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await
            .map_err(PlaceOrderError::ItemsInsert)?;
        }

        if let Some(coupon_id) = order.coupon {
            // Bounded increment: the WHERE clause makes the limit check and
            // the increment one atomic statement, so concurrent redemptions
            // cannot race past usage_limit.
            let result = sqlx::query(
                r"
                UPDATE shop.coupon
                SET usage_count = usage_count + 1
                WHERE id = $1
                  AND (usage_limit IS NULL OR usage_count < usage_limit)
                ",
            )
            .bind(coupon_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(PlaceOrderError::CouponExhausted);
            }
        }

        if order.payment_method.is_offline() {
            sqlx::query("UPDATE shop.user SET cart = '[]'::jsonb, updated_at = NOW() WHERE id = $1")
                .bind(order.user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(OrderId::new(order_id))
    }

    /// Finalize a card payment: absolute update to `paid` with the
    /// provider's reconciliation fields.
    ///
    /// The update is idempotent - re-running it with the same inputs writes
    /// the same values - so confirmation can safely be retried.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order matches the id/user
    /// pair.
    pub async fn mark_paid(
        &self,
        order_id: OrderId,
        user_id: UserId,
        session_id: &str,
        fee: Option<Decimal>,
        payout: Option<Decimal>,
        paid_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.order
            SET status = $1,
                payment_method = $2,
                stripe_session_id = $3,
                stripe_fee = $4,
                stripe_payout = $5,
                paid_at = $6
            WHERE id = $7 AND user_id = $8
            ",
        )
        .bind(OrderStatus::Paid.to_string())
        .bind(PaymentMethod::Stripe.to_string())
        .bind(session_id)
        .bind(fee)
        .bind(payout)
        .bind(paid_at)
        .bind(order_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Record the provider checkout session started for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_checkout_session(
        &self,
        order_id: OrderId,
        session_id: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE shop.order SET stripe_session_id = $1 WHERE id = $2")
                .bind(session_id)
                .bind(order_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Order history for a shopper, newest first. Archived orders are
    /// hidden.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: i32,
            status: String,
            total: Decimal,
            payment_method: String,
            created_at: DateTime<Utc>,
        }

        let rows: Vec<Row> = sqlx::query_as(
            r"
            SELECT id, status, total, payment_method, created_at
            FROM shop.order
            WHERE user_id = $1 AND status <> 'archived'
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let status = OrderStatus::from_str(&r.status).map_err(|e| {
                    RepositoryError::DataCorruption(format!("order {}: {e}", r.id))
                })?;
                let payment_method = PaymentMethod::from_str(&r.payment_method).map_err(|e| {
                    RepositoryError::DataCorruption(format!("order {}: {e}", r.id))
                })?;
                Ok(OrderSummary {
                    id: OrderId::new(r.id),
                    status,
                    total: r.total,
                    payment_method,
                    created_at: r.created_at,
                })
            })
            .collect()
    }

    /// Fetch one of the shopper's orders with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_user(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order WHERE id = $1 AND user_id = $2"
        ))
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items: Vec<OrderItemRow> = sqlx::query_as(
            r"
            SELECT id, order_id, product_id, quantity, price
            FROM shop.order_item
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        let items = items.into_iter().map(OrderItem::from).collect();
        Some(row.into_order(items)).transpose()
    }
}
