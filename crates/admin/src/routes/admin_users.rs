//! Admin user management routes (super_admin only).

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

use tamarind_core::{AdminRole, AdminUserId};

use crate::db::admin_users::AdminUserRepository;
use crate::error::Result;
use crate::middleware::RequireSuperAdmin;
use crate::models::AdminUser;
use crate::services::auth::hash_password;
use crate::state::AppState;

/// Create admin request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAdminRequest {
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    pub password: String,
    pub role: AdminRole,
}

/// Role change request.
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: AdminRole,
}

/// List all admin accounts.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    _admin: RequireSuperAdmin,
) -> Result<Json<Vec<AdminUser>>> {
    let admins = AdminUserRepository::new(state.pool()).list().await?;
    Ok(Json(admins))
}

/// Create an admin account.
#[instrument(skip(state, req), fields(admin = %admin.0.email))]
pub async fn create(
    State(state): State<AppState>,
    admin: RequireSuperAdmin,
    Json(req): Json<CreateAdminRequest>,
) -> Result<Json<AdminUser>> {
    req.validate()?;
    let password_hash = hash_password(&req.password)?;

    let created = AdminUserRepository::new(state.pool())
        .create(req.email.trim(), &password_hash, req.role)
        .await?;

    tracing::info!(email = %created.email, role = %created.role, "admin account created");
    Ok(Json(created))
}

/// Change an admin account's role.
#[instrument(skip(state), fields(admin = %admin.0.email))]
pub async fn set_role(
    State(state): State<AppState>,
    admin: RequireSuperAdmin,
    Path(id): Path<AdminUserId>,
    Json(req): Json<SetRoleRequest>,
) -> Result<Json<serde_json::Value>> {
    AdminUserRepository::new(state.pool())
        .set_role(id, req.role)
        .await?;

    tracing::info!(admin_user_id = %id, role = %req.role, "admin role changed");
    Ok(Json(serde_json::json!({ "success": true })))
}
