//! Server-side cart storage keyed by cart ID.
//!
//! The session only carries a visitor's [`CartId`]; the cart itself lives
//! here behind a per-cart async mutex. Holding the guard is the only way to
//! read or change a cart, so requests on the same cart apply one at a time.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::state::CartState;

/// Identifier stored in the visitor's session.
pub type CartId = Uuid;

/// Exclusive access to one cart.
pub type CartGuard = OwnedMutexGuard<CartState>;

/// All live carts.
///
/// Cheap to clone. Carts idle for longer than the configured timeout are
/// evicted, matching session inactivity expiry.
#[derive(Clone)]
pub struct CartRegistry {
    carts: Cache<CartId, Arc<Mutex<CartState>>>,
}

impl CartRegistry {
    #[must_use]
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            carts: Cache::builder().time_to_idle(idle_timeout).build(),
        }
    }

    /// Wait for exclusive access to cart `id`, creating an empty cart if
    /// none is stored.
    pub async fn lock(&self, id: CartId) -> CartGuard {
        let cart = self
            .carts
            .get_with(id, async { Arc::new(Mutex::new(CartState::default())) })
            .await;
        cart.lock_owned().await
    }
}

impl std::fmt::Debug for CartRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartRegistry")
            .field("carts", &self.carts.entry_count())
            .finish()
    }
}
