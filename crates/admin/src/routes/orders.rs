//! Admin order routes.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use tamarind_core::{OrderId, OrderStatus, OrderTotals, ProductId};

use crate::db::orders::{EditOrder, EditOrderItem, OrderAdminRepository};
use crate::error::{AdminError, Result};
use crate::middleware::{RequireAdmin, RequireWriter};
use crate::models::{AdminOrder, AdminOrderSummary};
use crate::state::AppState;

const PAGE_SIZE: i64 = 50;

/// Listing query string.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    pub page: Option<i64>,
}

/// Status update request.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

/// One replacement line in an order edit.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct EditItemRequest {
    pub product_id: ProductId,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    pub price: Decimal,
}

/// Full order edit request. The item set replaces the existing one
/// entirely; totals are recomputed server-side from the new items.
#[derive(Debug, Deserialize, Validate)]
pub struct EditRequest {
    #[validate(length(min = 5, message = "shipping address is too short"))]
    pub shipping_address: String,
    pub billing_address: Option<String>,
    pub discount: Option<Decimal>,
    pub shipping_cost: Option<Decimal>,
    #[validate(nested)]
    #[validate(length(min = 1, message = "an order needs at least one item"))]
    pub items: Vec<EditItemRequest>,
}

/// Paginated order listing.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AdminOrderSummary>>> {
    let page = query.page.unwrap_or(0).max(0);
    let orders = OrderAdminRepository::new(state.pool())
        .list(query.status, PAGE_SIZE, page * PAGE_SIZE)
        .await?;
    Ok(Json(orders))
}

/// Order detail with items.
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(order_id): Path<OrderId>,
) -> Result<Json<AdminOrder>> {
    OrderAdminRepository::new(state.pool())
        .get(order_id)
        .await?
        .map(Json)
        .ok_or_else(|| AdminError::NotFound(format!("order {order_id}")))
}

/// Update an order's status.
#[instrument(skip(state), fields(admin = %admin.0.email))]
pub async fn update_status(
    State(state): State<AppState>,
    admin: RequireWriter,
    Path(order_id): Path<OrderId>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<serde_json::Value>> {
    OrderAdminRepository::new(state.pool())
        .update_status(order_id, req.status)
        .await?;

    tracing::info!(order_id = %order_id, status = %req.status, "order status updated");
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Soft-remove an order.
#[instrument(skip(state), fields(admin = %admin.0.email))]
pub async fn archive(
    State(state): State<AppState>,
    admin: RequireWriter,
    Path(order_id): Path<OrderId>,
) -> Result<Json<serde_json::Value>> {
    OrderAdminRepository::new(state.pool())
        .archive(order_id)
        .await?;

    tracing::info!(order_id = %order_id, "order archived");
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Replace an order's addresses and items.
///
/// The new subtotal is the sum over the replacement items; discount and
/// shipping default to the order's existing values when not supplied, and
/// the stored total always satisfies `total = subtotal + shipping -
/// discount`.
#[instrument(skip(state, req), fields(admin = %admin.0.email))]
pub async fn edit(
    State(state): State<AppState>,
    admin: RequireWriter,
    Path(order_id): Path<OrderId>,
    Json(req): Json<EditRequest>,
) -> Result<Json<AdminOrder>> {
    req.validate()?;

    let repo = OrderAdminRepository::new(state.pool());
    let existing = repo
        .get(order_id)
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("order {order_id}")))?;

    let subtotal: Decimal = req
        .items
        .iter()
        .map(|i| i.price * Decimal::from(i.quantity))
        .sum();
    let discount = req.discount.unwrap_or(existing.discount);
    let shipping_cost = req.shipping_cost.unwrap_or(existing.shipping_cost);

    let totals = OrderTotals::compute(subtotal, shipping_cost, discount).map_err(|e| {
        AdminError::Validation(std::collections::HashMap::from([(
            "total".to_owned(),
            vec![e.to_string()],
        )]))
    })?;

    let billing_address = req
        .billing_address
        .clone()
        .unwrap_or_else(|| req.shipping_address.clone());

    repo.edit(
        order_id,
        &EditOrder {
            shipping_address: req.shipping_address.clone(),
            billing_address,
            totals,
            items: req
                .items
                .iter()
                .map(|i| EditOrderItem {
                    product_id: i.product_id,
                    quantity: i.quantity,
                    price: i.price,
                })
                .collect(),
        },
    )
    .await?;

    tracing::info!(order_id = %order_id, "order edited");

    repo.get(order_id)
        .await?
        .map(Json)
        .ok_or_else(|| AdminError::NotFound(format!("order {order_id}")))
}
