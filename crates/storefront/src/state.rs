//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::models::Product;
use crate::payments::StripeClient;
use crate::services::cart::CartSyncer;

/// Catalog cache TTL.
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(300);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    stripe: StripeClient,
    cart_sync: CartSyncer,
    catalog_cache: Cache<String, Arc<Vec<Product>>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let stripe = StripeClient::new(&config.stripe);
        let cart_sync = CartSyncer::new(pool.clone(), config.cart_sync_debounce);
        let catalog_cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                stripe,
                cart_sync,
                catalog_cache,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the payment provider client.
    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }

    /// Get a reference to the debounced remote-cart writer.
    #[must_use]
    pub fn cart_sync(&self) -> &CartSyncer {
        &self.inner.cart_sync
    }

    /// Get a reference to the catalog listing cache.
    #[must_use]
    pub fn catalog_cache(&self) -> &Cache<String, Arc<Vec<Product>>> {
        &self.inner.catalog_cache
    }
}
