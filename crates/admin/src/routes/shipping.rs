//! Admin shipping zone routes.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

use tamarind_core::ShippingZoneId;

use crate::db::shipping::{ShippingAdminRepository, ShippingZoneInput};
use crate::error::{AdminError, Result};
use crate::middleware::{RequireAdmin, RequireWriter};
use crate::models::ShippingZone;
use crate::state::AppState;

/// Create/update shipping zone request.
#[derive(Debug, Deserialize, Validate)]
pub struct ZoneRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "at least one region is required"))]
    pub regions: Vec<String>,
    pub rate: Decimal,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl ZoneRequest {
    fn check_rate(&self) -> Result<()> {
        if self.rate < Decimal::ZERO {
            return Err(AdminError::Validation(std::collections::HashMap::from([(
                "rate".to_owned(),
                vec!["must not be negative".to_owned()],
            )])));
        }
        Ok(())
    }

    fn into_input(self) -> ShippingZoneInput {
        ShippingZoneInput {
            name: self.name,
            regions: self.regions,
            rate: self.rate,
            active: self.active,
        }
    }
}

/// List all zones.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<ShippingZone>>> {
    let zones = ShippingAdminRepository::new(state.pool()).list().await?;
    Ok(Json(zones))
}

/// Create a zone.
#[instrument(skip(state, req), fields(admin = %admin.0.email))]
pub async fn create(
    State(state): State<AppState>,
    admin: RequireWriter,
    Json(req): Json<ZoneRequest>,
) -> Result<Json<ShippingZone>> {
    req.validate()?;
    req.check_rate()?;

    let zone = ShippingAdminRepository::new(state.pool())
        .create(&req.into_input())
        .await?;

    tracing::info!(zone = %zone.name, "shipping zone created");
    Ok(Json(zone))
}

/// Update a zone.
#[instrument(skip(state, req), fields(admin = %admin.0.email))]
pub async fn update(
    State(state): State<AppState>,
    admin: RequireWriter,
    Path(id): Path<ShippingZoneId>,
    Json(req): Json<ZoneRequest>,
) -> Result<Json<ShippingZone>> {
    req.validate()?;
    req.check_rate()?;

    let zone = ShippingAdminRepository::new(state.pool())
        .update(id, &req.into_input())
        .await?;

    tracing::info!(zone = %zone.name, "shipping zone updated");
    Ok(Json(zone))
}

/// Delete a zone.
#[instrument(skip(state), fields(admin = %admin.0.email))]
pub async fn remove(
    State(state): State<AppState>,
    admin: RequireWriter,
    Path(id): Path<ShippingZoneId>,
) -> Result<Json<serde_json::Value>> {
    ShippingAdminRepository::new(state.pool()).delete(id).await?;

    tracing::info!(zone_id = %id, "shipping zone deleted");
    Ok(Json(serde_json::json!({ "success": true })))
}
