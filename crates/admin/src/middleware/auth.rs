//! Admin authentication extractors.
//!
//! Three tiers: [`RequireAdmin`] (any authenticated admin, including
//! read-only viewers), [`RequireWriter`] (roles that may mutate store
//! data), and [`RequireSuperAdmin`] (admin user management).

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AdminError;
use crate::models::{CurrentAdmin, session_keys};

async fn current_admin(parts: &Parts) -> Result<CurrentAdmin, AdminError> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AdminError::Unauthorized)?;

    session
        .get(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
        .ok_or(AdminError::Unauthorized)
}

/// Extractor that requires any authenticated admin.
#[derive(Debug)]
pub struct RequireAdmin(pub CurrentAdmin);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_admin(parts).await.map(Self)
    }
}

/// Extractor that requires a role allowed to mutate store data.
#[derive(Debug)]
pub struct RequireWriter(pub CurrentAdmin);

impl<S> FromRequestParts<S> for RequireWriter
where
    S: Send + Sync,
{
    type Rejection = AdminError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = current_admin(parts).await?;
        if !admin.role.can_write() {
            return Err(AdminError::Forbidden("viewers are read-only".to_owned()));
        }
        Ok(Self(admin))
    }
}

/// Extractor that requires the `super_admin` role.
#[derive(Debug)]
pub struct RequireSuperAdmin(pub CurrentAdmin);

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = current_admin(parts).await?;
        if !admin.role.can_manage_admins() {
            return Err(AdminError::Forbidden(
                "admin user management requires super_admin".to_owned(),
            ));
        }
        Ok(Self(admin))
    }
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}
