//! Database operations for the storefront.
//!
//! All storefront and admin data lives in one `PostgreSQL` database under
//! the `shop` schema:
//!
//! - `shop.user` / `shop.user_password` - shopper accounts
//! - `shop.session` - tower-sessions storage
//! - `shop.product` - catalog
//! - `shop.order` / `shop.order_item` - placed orders and their snapshots
//! - `shop.coupon` - discount codes with bounded usage counters
//! - `shop.shipping_zone` - per-region shipping rates
//! - `shop.settings` - key/value configuration (payment method toggles)
//!
//! Repositories use runtime `query`/`query_as` with `FromRow` row structs;
//! multi-statement writes go through explicit transactions.
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p tamarind-cli -- migrate
//! ```

pub mod coupons;
pub mod orders;
pub mod products;
pub mod settings;
pub mod shipping;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The underlying query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row held data that no longer parses into its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The targeted row does not exist.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
