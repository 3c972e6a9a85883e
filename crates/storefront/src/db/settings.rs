//! Settings reads for the storefront.
//!
//! The admin crate writes `shop.settings`; the storefront only reads the
//! payment configuration to decide which checkout methods to accept.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use tamarind_core::PaymentMethod;

use super::RepositoryError;

/// Settings key holding the payment configuration.
pub const PAYMENTS_KEY: &str = "payments";

/// Which payment methods checkout accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSettings {
    pub cod_enabled: bool,
    pub stripe_enabled: bool,
    pub bank_enabled: bool,
    /// Instructions shown to the shopper for bank transfer orders.
    pub bank_instructions: Option<String>,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            cod_enabled: true,
            stripe_enabled: true,
            bank_enabled: false,
            bank_instructions: None,
        }
    }
}

impl PaymentSettings {
    /// Whether the given method is currently accepted.
    #[must_use]
    pub const fn accepts(&self, method: PaymentMethod) -> bool {
        match method {
            PaymentMethod::Cod => self.cod_enabled,
            PaymentMethod::Stripe => self.stripe_enabled,
            PaymentMethod::Bank => self.bank_enabled,
        }
    }
}

/// Load the payment settings, defaulting when the key is absent.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
/// Returns `RepositoryError::DataCorruption` if the stored value no longer
/// parses.
pub async fn payment_settings(pool: &PgPool) -> Result<PaymentSettings, RepositoryError> {
    let value: Option<serde_json::Value> =
        sqlx::query_scalar("SELECT value FROM shop.settings WHERE key = $1")
            .bind(PAYMENTS_KEY)
            .fetch_optional(pool)
            .await?;

    match value {
        Some(json) => serde_json::from_value(json).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment settings: {e}"))
        }),
        None => Ok(PaymentSettings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_accept_cod_and_stripe_only() {
        let settings = PaymentSettings::default();
        assert!(settings.accepts(PaymentMethod::Cod));
        assert!(settings.accepts(PaymentMethod::Stripe));
        assert!(!settings.accepts(PaymentMethod::Bank));
    }
}
