//! Admin order repository.
//!
//! Orders are never deleted. Removal is a status change to `archived`, and
//! editing replaces the full item set and totals in one transaction so the
//! line items always agree with the stored monetary fields.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tamarind_core::{
    OrderId, OrderItemId, OrderStatus, OrderTotals, PaymentMethod, ProductId, UserId,
};

use super::RepositoryError;
use crate::models::{AdminOrder, AdminOrderItem, AdminOrderSummary};

/// Replacement item set for an order edit.
#[derive(Debug, Clone)]
pub struct EditOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

/// A full order edit: new addresses and a new item set, with recomputed
/// totals supplied by the caller.
#[derive(Debug, Clone)]
pub struct EditOrder {
    pub shipping_address: String,
    pub billing_address: String,
    pub totals: OrderTotals,
    pub items: Vec<EditOrderItem>,
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
    fn into_order(self, items: Vec<AdminOrderItem>) -> Result<AdminOrder, RepositoryError> {
        let status = OrderStatus::from_str(&self.status)
            .map_err(|e| RepositoryError::DataCorruption(format!("order {}: {e}", self.id)))?;
        let payment_method = PaymentMethod::from_str(&self.payment_method)
            .map_err(|e| RepositoryError::DataCorruption(format!("order {}: {e}", self.id)))?;

        Ok(AdminOrder {
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

const ORDER_COLUMNS: &str = "id, user_id, email, status, subtotal, discount, shipping_cost, \
     total, payment_method, shipping_address, billing_address, coupon_code, \
     stripe_session_id, stripe_fee, stripe_payout, paid_at, created_at";

/// Repository for admin order operations.
pub struct OrderAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderAdminRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Paginated order listing, optionally filtered by status, newest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AdminOrderSummary>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: i32,
            email: String,
            status: String,
            total: Decimal,
            payment_method: String,
            created_at: DateTime<Utc>,
        }

        let rows: Vec<Row> = sqlx::query_as(
            r"
            SELECT id, email, status, total, payment_method, created_at
            FROM shop.order
            WHERE ($1::text IS NULL AND status <> 'archived') OR status = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(status.map(|s| s.to_string()))
        .bind(limit)
        .bind(offset)
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
                Ok(AdminOrderSummary {
                    id: OrderId::new(r.id),
                    email: r.email,
                    status,
                    total: r.total,
                    payment_method,
                    created_at: r.created_at,
                })
            })
            .collect()
    }

    /// Fetch one order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, order_id: OrderId) -> Result<Option<AdminOrder>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.items_for(order_id).await?;
        Some(row.into_order(items)).transpose()
    }

    /// Update an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.order SET status = $1 WHERE id = $2")
            .bind(status.to_string())
            .bind(order_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Replace an order's addresses, item set, and totals in one
    /// transaction (delete-and-reinsert, not incremental patch).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist. Any
    /// failure rolls the whole edit back.
    pub async fn edit(&self, order_id: OrderId, edit: &EditOrder) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r"
            UPDATE shop.order
            SET shipping_address = $1,
                billing_address = $2,
                subtotal = $3,
                discount = $4,
                shipping_cost = $5,
                total = $6
            WHERE id = $7
            ",
        )
        .bind(&edit.shipping_address)
        .bind(&edit.billing_address)
        .bind(edit.totals.subtotal)
        .bind(edit.totals.discount)
        .bind(edit.totals.shipping_cost)
        .bind(edit.totals.total)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM shop.order_item WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        for item in &edit.items {
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
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Soft-remove an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn archive(&self, order_id: OrderId) -> Result<(), RepositoryError> {
        self.update_status(order_id, OrderStatus::Archived).await
    }

    /// Count of orders and revenue per status, for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals_by_status(
        &self,
    ) -> Result<Vec<(OrderStatus, i64, Decimal)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            status: String,
            count: i64,
            revenue: Decimal,
        }

        let rows: Vec<Row> = sqlx::query_as(
            r"
            SELECT status, COUNT(*) AS count, COALESCE(SUM(total), 0) AS revenue
            FROM shop.order
            GROUP BY status
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let status = OrderStatus::from_str(&r.status)
                    .map_err(RepositoryError::DataCorruption)?;
                Ok((status, r.count, r.revenue))
            })
            .collect()
    }

    async fn items_for(&self, order_id: OrderId) -> Result<Vec<AdminOrderItem>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: i32,
            product_id: i32,
            quantity: i32,
            price: Decimal,
        }

        let rows: Vec<Row> = sqlx::query_as(
            r"
            SELECT id, product_id, quantity, price
            FROM shop.order_item
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| AdminOrderItem {
                id: OrderItemId::new(r.id),
                product_id: ProductId::new(r.product_id),
                quantity: r.quantity,
                price: r.price,
            })
            .collect())
    }
}
