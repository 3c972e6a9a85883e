//! Product browsing routes.
//!
//! The active-product listing is cached for five minutes; detail lookups
//! go straight to the database.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::state::AppState;

/// Cache key for the active-product listing.
const LISTING_KEY: &str = "active_products";

/// List active products.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state
        .catalog_cache()
        .try_get_with(LISTING_KEY.to_string(), async {
            ProductRepository::new(state.pool())
                .list_active()
                .await
                .map(Arc::new)
        })
        .await
        .map_err(|e| AppError::Internal(format!("catalog load failed: {e}")))?;

    Ok(Json(products.as_ref().clone()))
}

/// Show one product by slug.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))
}
