//! The cart store: owned state plus subscribers.

use std::fmt;

use marketstall_core::{Product, ProductId};
use rust_decimal::Decimal;
use tracing::debug;

use super::snapshot::OrderSnapshot;
use super::state::{CartAction, CartState};

/// Callback invoked after every applied action with the action and the
/// resulting state.
pub type Listener = Box<dyn Fn(&CartAction, &CartState) + Send + Sync>;

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Owner of a single cart.
///
/// All changes go through the operation methods, which take `&mut self`;
/// readers only ever see `&CartState` or an owned [`OrderSnapshot`].
#[derive(Default)]
pub struct CartStore {
    state: CartState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create a store holding an empty, closed cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store around previously persisted state.
    #[must_use]
    pub fn from_state(state: CartState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// Consume the store, returning its state. Subscribers are dropped.
    #[must_use]
    pub fn into_state(self) -> CartState {
        self.state
    }

    /// Register a listener called after every applied action.
    ///
    /// Listeners run in registration order.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&CartAction, &CartState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Apply an action and notify subscribers.
    pub fn dispatch(&mut self, action: CartAction) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(&action);

        debug!(
            action = action.kind(),
            lines = self.state.lines().len(),
            total_items = self.state.total_items(),
            total_price = %self.state.total_price(),
            is_open = self.state.is_open(),
            "Cart action applied"
        );

        for (_, listener) in &self.listeners {
            listener(&action, &self.state);
        }
    }

    /// Add one unit of `product`.
    pub fn add_item(&mut self, product: Product) {
        self.dispatch(CartAction::AddItem(Box::new(product)));
    }

    /// Remove the line for `product_id`, if present.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        self.dispatch(CartAction::RemoveItem(product_id.clone()));
    }

    /// Set the quantity for `product_id`. Zero or negative removes the line;
    /// an unknown product is ignored.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        self.dispatch(CartAction::UpdateQuantity {
            product_id: product_id.clone(),
            quantity,
        });
    }

    pub fn clear_cart(&mut self) {
        self.dispatch(CartAction::ClearCart);
    }

    pub fn toggle_cart(&mut self) {
        self.dispatch(CartAction::ToggleCart);
    }

    pub fn set_cart_open(&mut self, is_open: bool) {
        self.dispatch(CartAction::SetCartOpen(is_open));
    }

    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.state.total_items()
    }

    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.state.total_price()
    }

    /// Owned copy of the cart for order submission.
    #[must_use]
    pub fn snapshot(&self) -> OrderSnapshot {
        self.state.snapshot()
    }
}
