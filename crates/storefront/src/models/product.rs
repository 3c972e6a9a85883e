//! Catalog product model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tamarind_core::ProductId;

/// A catalog product as served to the storefront.
///
/// `price` here is the authoritative price: checkout re-derives order
/// subtotals from this row, never from cart line snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
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
}
