//! Shopping cart state machine.
//!
//! # Architecture
//!
//! - [`CartState`] is a plain value: ordered lines plus the drawer visibility
//!   flag. Transitions are a pure reducer over [`CartAction`].
//! - [`CartStore`] owns one `CartState`, applies actions through the reducer
//!   and notifies subscribers afterwards.
//! - Totals are derived on every read and never stored.
//! - [`OrderSnapshot`] is the owned copy handed to checkout.
//! - [`CartRegistry`] holds every visitor's cart behind its own lock; the
//!   session only stores the [`CartId`].
//!
//! # Example
//!
//! ```rust,ignore
//! use marketstall_storefront::cart::CartStore;
//!
//! let mut store = CartStore::new();
//! store.subscribe(|action, state| {
//!     tracing::info!(action = action.kind(), items = state.total_items(), "cart changed");
//! });
//!
//! store.add_item(product.clone());
//! store.add_item(product);
//! assert_eq!(store.total_items(), 2);
//! ```

mod line;
mod registry;
mod snapshot;
mod state;
mod store;

pub use line::CartLine;
pub use registry::{CartGuard, CartId, CartRegistry};
pub use snapshot::{OrderSnapshot, SnapshotLine};
pub use state::{CartAction, CartState, DuplicateLineError};
pub use store::{CartStore, Listener, SubscriptionId};
