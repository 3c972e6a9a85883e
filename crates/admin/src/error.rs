//! Unified error handling for the admin API.
//!
//! Same shape as the storefront: failures become a tagged JSON body at the
//! axum boundary, server-side errors are captured to Sentry first.

use std::collections::HashMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::db::RepositoryError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AdminError {
    /// No authenticated admin identity.
    #[error("unauthorized")]
    Unauthorized,

    /// The admin's role does not permit this action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Input failed schema validation.
    #[error("validation failed")]
    Validation(HashMap<String, Vec<String>>),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness conflict (duplicate code, slug, email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(RepositoryError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AdminError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            RepositoryError::NotFound => Self::NotFound("resource".to_owned()),
            other => Self::Database(other),
        }
    }
}

impl From<ValidationErrors> for AdminError {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map_or_else(|| e.code.to_string(), ToString::to_string)
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        Self::Validation(fields)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<HashMap<String, Vec<String>>>,
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (status, code) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        let fields = match self {
            Self::Validation(fields) => Some(fields),
            _ => None,
        };

        (status, Json(ErrorBody { error: code, message, fields })).into_response()
    }
}

/// Result type alias for `AdminError`.
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_conflicts_become_409() {
        let err = AdminError::from(RepositoryError::Conflict("duplicate code".into()));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn forbidden_is_403() {
        let err = AdminError::Forbidden("viewers are read-only".into());
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }
}
