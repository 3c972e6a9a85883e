//! Settings database operations.
//!
//! Key/value JSON rows in `shop.settings`. The storefront reads these; the
//! admin writes them.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use super::RepositoryError;

/// Settings key holding the payment configuration.
pub const PAYMENTS_KEY: &str = "payments";

/// Payment method toggles, as edited by the admin.
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

/// Get a raw setting value.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn get_setting(pool: &PgPool, key: &str) -> Result<Option<JsonValue>, RepositoryError> {
    let value: Option<JsonValue> =
        sqlx::query_scalar("SELECT value FROM shop.settings WHERE key = $1")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    Ok(value)
}

/// Upsert a setting value.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn set_setting(
    pool: &PgPool,
    key: &str,
    value: &JsonValue,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO shop.settings (key, value)
        VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
        ",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the payment settings, defaulting when the key is absent.
///
/// # Errors
///
/// Returns an error if the query fails or the stored value no longer
/// parses.
pub async fn payment_settings(pool: &PgPool) -> Result<PaymentSettings, RepositoryError> {
    match get_setting(pool, PAYMENTS_KEY).await? {
        Some(json) => serde_json::from_value(json).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment settings: {e}"))
        }),
        None => Ok(PaymentSettings::default()),
    }
}

/// Store the payment settings.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn set_payment_settings(
    pool: &PgPool,
    settings: &PaymentSettings,
) -> Result<(), RepositoryError> {
    let json = serde_json::to_value(settings).map_err(|e| {
        RepositoryError::DataCorruption(format!("failed to serialize payment settings: {e}"))
    })?;
    set_setting(pool, PAYMENTS_KEY, &json).await
}
