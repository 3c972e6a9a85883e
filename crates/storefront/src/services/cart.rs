//! Cart replica management.
//!
//! The session holds the local cart replica; `shop.user.cart` holds the
//! remote one. Mutations update the session immediately and schedule a
//! debounced remote write through [`CartSyncer`]: a single-shot delayed
//! task per user, where each new mutation replaces the pending task so a
//! burst of edits collapses into one write after the quiet period.
//!
//! Remote write failures are logged and dropped - never retried, never
//! surfaced. The session replica stays authoritative until the next
//! successful sync, and the next sign-in merge reconciles whatever was
//! lost. Blocking an interactive cart edit on a network write is the one
//! thing this module must never do.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sqlx::PgPool;
use tower_sessions::Session;

use tamarind_core::{Cart, UserId};

use crate::db::users::UserRepository;
use crate::models::session_keys;

/// Load the session-local cart replica, defaulting to empty.
pub async fn session_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Store the session-local cart replica.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_session_cart(
    session: &Session,
    cart: &Cart,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

type FlushFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type FlushFn = Arc<dyn Fn(UserId, Cart) -> FlushFuture + Send + Sync>;

/// Debounced remote-cart writer.
///
/// `schedule` replaces any pending write for the same user and starts the
/// quiet-period timer over (last write wins). Distinct users debounce
/// independently.
#[derive(Clone)]
pub struct CartSyncer {
    inner: Arc<SyncerInner>,
}

struct SyncerInner {
    delay: Duration,
    flush: FlushFn,
    pending: Mutex<HashMap<i32, tokio::task::JoinHandle<()>>>,
}

impl CartSyncer {
    /// Create a syncer that flushes to the remote replica in `pool`.
    #[must_use]
    pub fn new(pool: PgPool, delay: Duration) -> Self {
        let flush: FlushFn = Arc::new(move |user_id, cart| {
            let pool = pool.clone();
            Box::pin(async move {
                let users = UserRepository::new(&pool);
                if let Err(e) = users.save_cart(user_id, &cart).await {
                    // Availability over consistency: the session replica is
                    // still authoritative, so a lost sync is recoverable.
                    tracing::warn!(user_id = %user_id, "remote cart sync failed: {e}");
                }
            })
        });

        Self::with_flush(delay, flush)
    }

    /// Create a syncer with a custom flush function (used by tests).
    #[must_use]
    pub fn with_flush(delay: Duration, flush: FlushFn) -> Self {
        Self {
            inner: Arc::new(SyncerInner {
                delay,
                flush,
                pending: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Schedule a remote write of `cart` after the quiet period, replacing
    /// any write still pending for this user.
    pub fn schedule(&self, user_id: UserId, cart: Cart) {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            tokio::time::sleep(inner.delay).await;
            (inner.flush)(user_id, cart).await;
        });

        let Ok(mut pending) = self.inner.pending.lock() else {
            // A panicked flush task poisoned the lock; the new task still
            // runs, we just lose the ability to cancel stale ones.
            return;
        };
        pending.retain(|_, handle| !handle.is_finished());
        if let Some(previous) = pending.insert(user_id.get(), task) {
            previous.abort();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(2000);

    type Flushes = Arc<Mutex<Vec<(i32, u32)>>>;

    fn recording_syncer() -> (CartSyncer, Flushes) {
        let flushes: Flushes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&flushes);
        let flush: FlushFn = Arc::new(move |user_id, cart: Cart| {
            let sink = Arc::clone(&sink);
            Box::pin(async move {
                sink.lock().unwrap().push((user_id.get(), cart.total_items()));
            })
        });
        (CartSyncer::with_flush(DELAY, flush), flushes)
    }

    fn cart_with(quantity: u32) -> Cart {
        let mut cart = Cart::new();
        cart.add_line(
            tamarind_core::CartLine {
                id: tamarind_core::ProductId::new(1),
                name: "widget".to_owned(),
                price: rust_decimal::Decimal::ONE,
                image: None,
                slug: "widget".to_owned(),
                category: None,
                quantity: 1,
            },
            quantity,
        );
        cart
    }

    /// Let spawned tasks run without advancing the clock.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_edits_collapses_into_one_flush() {
        let (syncer, flushes) = recording_syncer();
        let user = UserId::new(7);

        syncer.schedule(user, cart_with(1));
        syncer.schedule(user, cart_with(2));
        syncer.schedule(user, cart_with(3));
        settle().await;

        tokio::time::advance(DELAY + Duration::from_millis(1)).await;
        settle().await;

        // Only the last cart was written, exactly once.
        assert_eq!(*flushes.lock().unwrap(), vec![(7, 3)]);
    }

    #[tokio::test(start_paused = true)]
    async fn new_edit_resets_the_quiet_period() {
        let (syncer, flushes) = recording_syncer();
        let user = UserId::new(7);

        syncer.schedule(user, cart_with(1));
        settle().await;
        tokio::time::advance(DELAY / 2).await;
        settle().await;
        assert!(flushes.lock().unwrap().is_empty());

        // The second edit replaces the pending write; half the original
        // delay later nothing has flushed yet.
        syncer.schedule(user, cart_with(2));
        settle().await;
        tokio::time::advance(DELAY / 2 + Duration::from_millis(1)).await;
        settle().await;
        assert!(flushes.lock().unwrap().is_empty());

        tokio::time::advance(DELAY / 2).await;
        settle().await;
        assert_eq!(*flushes.lock().unwrap(), vec![(7, 2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn users_debounce_independently() {
        let (syncer, flushes) = recording_syncer();

        syncer.schedule(UserId::new(1), cart_with(1));
        syncer.schedule(UserId::new(2), cart_with(2));
        settle().await;

        tokio::time::advance(DELAY + Duration::from_millis(1)).await;
        settle().await;

        let mut seen = flushes.lock().unwrap().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![(1, 1), (2, 2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_after_quiet_period_then_again_on_next_edit() {
        let (syncer, flushes) = recording_syncer();
        let user = UserId::new(5);

        syncer.schedule(user, cart_with(1));
        settle().await;
        tokio::time::advance(DELAY + Duration::from_millis(1)).await;
        settle().await;

        syncer.schedule(user, cart_with(4));
        settle().await;
        tokio::time::advance(DELAY + Duration::from_millis(1)).await;
        settle().await;

        assert_eq!(*flushes.lock().unwrap(), vec![(5, 1), (5, 4)]);
    }
}
