//! Order history routes (requires auth).

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use tamarind_core::OrderId;

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderSummary};
use crate::state::AppState;

/// List the shopper's orders, newest first.
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<OrderSummary>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(orders))
}

/// Show one of the shopper's orders with its items.
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<Json<Order>> {
    OrderRepository::new(state.pool())
        .get_for_user(order_id, user.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))
}
