//! Dashboard aggregation route.

use std::collections::HashMap;

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use tamarind_core::OrderStatus;

use crate::db::orders::OrderAdminRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Per-status order counts and revenue.
#[derive(Debug, Serialize)]
pub struct StatusBucket {
    pub count: i64,
    pub revenue: Decimal,
}

/// Dashboard payload.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub total_orders: i64,
    /// Revenue over paid and later statuses (excludes pending/cancelled).
    pub settled_revenue: Decimal,
    pub by_status: HashMap<String, StatusBucket>,
}

/// Show the dashboard.
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Dashboard>> {
    let buckets = OrderAdminRepository::new(state.pool())
        .totals_by_status()
        .await?;

    let mut total_orders = 0;
    let mut settled_revenue = Decimal::ZERO;
    let mut by_status = HashMap::new();

    for (status, count, revenue) in buckets {
        total_orders += count;
        if matches!(
            status,
            OrderStatus::Paid | OrderStatus::Processing | OrderStatus::Shipped | OrderStatus::Delivered
        ) {
            settled_revenue += revenue;
        }
        by_status.insert(status.to_string(), StatusBucket { count, revenue });
    }

    Ok(Json(Dashboard {
        total_orders,
        settled_revenue,
        by_status,
    }))
}
