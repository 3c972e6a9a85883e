//! Admin authentication routes.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use tamarind_core::AdminRole;

use crate::error::{AdminError, Result};
use crate::middleware::set_current_admin;
use crate::models::{CurrentAdmin, session_keys};
use crate::services::auth as auth_service;
use crate::state::AppState;

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub email: String,
    pub role: AdminRole,
}

/// Admin login.
#[instrument(skip(state, session, req))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let admin = auth_service::login(state.pool(), &req.email, &req.password).await?;

    let current = CurrentAdmin {
        id: admin.id,
        email: admin.email.clone(),
        role: admin.role,
    };
    set_current_admin(&session, &current)
        .await
        .map_err(|e| AdminError::Internal(format!("session write failed: {e}")))?;

    tracing::info!(admin = %admin.email, "admin logged in");
    Ok(Json(LoginResponse {
        success: true,
        email: admin.email,
        role: admin.role,
    }))
}

/// Admin logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .map_err(|e| AdminError::Internal(format!("session write failed: {e}")))?;

    Ok(Json(serde_json::json!({ "success": true })))
}
