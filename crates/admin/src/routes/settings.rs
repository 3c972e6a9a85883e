//! Payment settings routes.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use crate::db::settings::{PaymentSettings, payment_settings, set_payment_settings};
use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireWriter};
use crate::state::AppState;

/// Payment settings update request.
#[derive(Debug, Deserialize)]
pub struct PaymentSettingsRequest {
    pub cod_enabled: bool,
    pub stripe_enabled: bool,
    pub bank_enabled: bool,
    pub bank_instructions: Option<String>,
}

/// Show the payment settings.
#[instrument(skip(state, _admin))]
pub async fn show_payments(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<PaymentSettings>> {
    let settings = payment_settings(state.pool()).await?;
    Ok(Json(settings))
}

/// Update the payment settings.
#[instrument(skip(state, req), fields(admin = %admin.0.email))]
pub async fn update_payments(
    State(state): State<AppState>,
    admin: RequireWriter,
    Json(req): Json<PaymentSettingsRequest>,
) -> Result<Json<PaymentSettings>> {
    let settings = PaymentSettings {
        cod_enabled: req.cod_enabled,
        stripe_enabled: req.stripe_enabled,
        bank_enabled: req.bank_enabled,
        bank_instructions: req.bank_instructions,
    };

    set_payment_settings(state.pool(), &settings).await?;

    tracing::info!("payment settings updated");
    Ok(Json(settings))
}
