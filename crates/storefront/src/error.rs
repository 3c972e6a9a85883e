//! Unified error handling with Sentry integration.
//!
//! All route handlers return `Result<T, AppError>`. Failures become a
//! tagged JSON body (`{"error": "...", "message": "...", "fields": {...}}`)
//! at the boundary; success payloads carry `{"success": true, ...}` at the
//! route level. Server-side failures are captured to Sentry before
//! responding.

use std::collections::HashMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use tamarind_core::CouponError;

use crate::db::RepositoryError;
use crate::db::orders::PlaceOrderError;
use crate::payments::PaymentError;
use crate::services::auth::AuthError;
use crate::services::checkout::PricingError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// No authenticated identity.
    #[error("unauthorized")]
    Unauthorized,

    /// Checkout or form input failed schema validation.
    #[error("validation failed")]
    Validation(HashMap<String, Vec<String>>),

    /// Checkout attempted with an empty remote cart.
    #[error("cart is empty")]
    EmptyCart,

    /// The order row could not be created.
    #[error("order creation failed: {0}")]
    OrderCreation(String),

    /// The order item snapshots could not be created.
    #[error("order items creation failed: {0}")]
    OrderItemsCreation(String),

    /// Payment could not be verified as complete.
    #[error("payment verification incomplete: {0}")]
    VerificationIncomplete(String),

    /// Coupon validation failed.
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// Authentication failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Payment provider operation failed.
    #[error("payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for AppError {
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

impl From<PricingError> for AppError {
    fn from(e: PricingError) -> Self {
        // A vanished or deactivated product invalidates the cart snapshot;
        // surface it as a field error on the cart itself.
        Self::Validation(HashMap::from([("cart".to_string(), vec![e.to_string()])]))
    }
}

impl From<PlaceOrderError> for AppError {
    fn from(e: PlaceOrderError) -> Self {
        match e {
            PlaceOrderError::OrderInsert(err) => Self::OrderCreation(err.to_string()),
            PlaceOrderError::ItemsInsert(err) => Self::OrderItemsCreation(err.to_string()),
            PlaceOrderError::CouponExhausted => Self::Coupon(CouponError::LimitReached),
            PlaceOrderError::Database(err) => {
                Self::Database(RepositoryError::Database(err))
            }
        }
    }
}

/// Machine-readable error tag, stable across message wording changes.
impl AppError {
    const fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Validation(_) => "validation_failed",
            Self::EmptyCart => "empty_cart",
            Self::OrderCreation(_) => "order_creation_failed",
            Self::OrderItemsCreation(_) => "order_items_creation_failed",
            Self::VerificationIncomplete(_) => "verification_incomplete",
            Self::Coupon(CouponError::Invalid(_)) => "coupon_invalid",
            Self::Coupon(CouponError::Expired) => "coupon_expired",
            Self::Coupon(CouponError::LimitReached) => "coupon_limit_reached",
            Self::Auth(_) => "auth_failed",
            Self::Database(_) => "database_error",
            Self::Payment(_) => "payment_error",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal_error",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<HashMap<String, Vec<String>>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_) | Self::Payment(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::EmptyCart | Self::Coupon(_) => StatusCode::BAD_REQUEST,
            Self::VerificationIncomplete(_) => StatusCode::PAYMENT_REQUIRED,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::Hash(_) | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::OrderCreation(_)
            | Self::OrderItemsCreation(_)
            | Self::Database(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Payment(_) => StatusCode::BAD_GATEWAY,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Payment(_) => "Payment provider error".to_string(),
            Self::OrderCreation(_) => "Could not create the order".to_string(),
            Self::OrderItemsCreation(_) => "Could not record the order items".to_string(),
            Self::Auth(AuthError::Hash(_) | AuthError::Repository(_)) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let code = self.code();
        let fields = match self {
            Self::Validation(fields) => Some(fields),
            _ => None,
        };

        let body = ErrorBody {
            error: code,
            message,
            fields,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn taxonomy_maps_to_expected_status_codes() {
        assert_eq!(status_of(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::EmptyCart), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(AppError::Coupon(CouponError::LimitReached)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::VerificationIncomplete("unpaid".into())),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            status_of(AppError::NotFound("order".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::OrderCreation("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn coupon_errors_keep_distinct_codes() {
        assert_eq!(
            AppError::Coupon(CouponError::Expired).code(),
            "coupon_expired"
        );
        assert_eq!(
            AppError::Coupon(CouponError::LimitReached).code(),
            "coupon_limit_reached"
        );
        assert_eq!(
            AppError::Coupon(CouponError::Invalid("x".into())).code(),
            "coupon_invalid"
        );
    }

    #[test]
    fn place_order_errors_split_by_failing_step() {
        let order = AppError::from(PlaceOrderError::OrderInsert(sqlx::Error::PoolClosed));
        assert_eq!(order.code(), "order_creation_failed");

        let items = AppError::from(PlaceOrderError::ItemsInsert(sqlx::Error::PoolClosed));
        assert_eq!(items.code(), "order_items_creation_failed");

        let coupon = AppError::from(PlaceOrderError::CouponExhausted);
        assert_eq!(coupon.code(), "coupon_limit_reached");
    }
}
