//! Admin catalog routes.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

use tamarind_core::ProductId;

use crate::db::products::{DeleteOutcome, ProductAdminRepository, ProductInput};
use crate::error::{AdminError, Result};
use crate::middleware::{RequireAdmin, RequireWriter};
use crate::models::AdminProduct;
use crate::state::AppState;

/// Create/update product request.
#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "slug is required"))]
    pub slug: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl ProductRequest {
    fn check_price(&self) -> Result<()> {
        if self.price < Decimal::ZERO {
            return Err(AdminError::Validation(std::collections::HashMap::from([(
                "price".to_owned(),
                vec!["must not be negative".to_owned()],
            )])));
        }
        Ok(())
    }

    fn into_input(self) -> ProductInput {
        ProductInput {
            name: self.name,
            slug: self.slug,
            price: self.price,
            image: self.image,
            category: self.category,
            brand: self.brand,
            tags: self.tags,
            active: self.active,
        }
    }
}

/// List all products.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<AdminProduct>>> {
    let products = ProductAdminRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// Create a product.
#[instrument(skip(state, req), fields(admin = %admin.0.email))]
pub async fn create(
    State(state): State<AppState>,
    admin: RequireWriter,
    Json(req): Json<ProductRequest>,
) -> Result<Json<AdminProduct>> {
    req.validate()?;
    req.check_price()?;

    let product = ProductAdminRepository::new(state.pool())
        .create(&req.into_input())
        .await?;

    tracing::info!(slug = %product.slug, "product created");
    Ok(Json(product))
}

/// Update a product.
#[instrument(skip(state, req), fields(admin = %admin.0.email))]
pub async fn update(
    State(state): State<AppState>,
    admin: RequireWriter,
    Path(id): Path<ProductId>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<AdminProduct>> {
    req.validate()?;
    req.check_price()?;

    let product = ProductAdminRepository::new(state.pool())
        .update(id, &req.into_input())
        .await?;

    tracing::info!(slug = %product.slug, "product updated");
    Ok(Json(product))
}

/// Delete a product; deactivates instead when order items reference it.
#[instrument(skip(state), fields(admin = %admin.0.email))]
pub async fn remove(
    State(state): State<AppState>,
    admin: RequireWriter,
    Path(id): Path<ProductId>,
) -> Result<Json<serde_json::Value>> {
    let outcome = ProductAdminRepository::new(state.pool()).delete(id).await?;

    let deactivated = outcome == DeleteOutcome::Deactivated;
    tracing::info!(product_id = %id, deactivated, "product removed");
    Ok(Json(serde_json::json!({
        "success": true,
        "deactivated": deactivated,
    })))
}
