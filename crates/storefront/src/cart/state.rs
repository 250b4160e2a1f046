//! Cart state and its reducer.

use std::collections::HashSet;
use std::num::NonZeroU32;

use marketstall_core::{Product, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::line::CartLine;
use super::snapshot::{OrderSnapshot, SnapshotLine};

/// A transition the cart can undergo.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add one unit of a product, merging with an existing line.
    AddItem(Box<Product>),
    /// Drop the line for a product.
    RemoveItem(ProductId),
    /// Set a line's quantity; zero or negative removes the line.
    UpdateQuantity { product_id: ProductId, quantity: i64 },
    /// Drop every line.
    ClearCart,
    /// Flip drawer visibility.
    ToggleCart,
    /// Set drawer visibility.
    SetCartOpen(bool),
}

impl CartAction {
    /// Stable name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AddItem(_) => "add_item",
            Self::RemoveItem(_) => "remove_item",
            Self::UpdateQuantity { .. } => "update_quantity",
            Self::ClearCart => "clear_cart",
            Self::ToggleCart => "toggle_cart",
            Self::SetCartOpen(_) => "set_cart_open",
        }
    }

    /// Whether the action can change the cart's lines (as opposed to only
    /// its visibility).
    #[must_use]
    pub const fn touches_lines(&self) -> bool {
        !matches!(self, Self::ToggleCart | Self::SetCartOpen(_))
    }
}

/// A deserialized cart contained two lines for the same product.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("duplicate cart line for product {0}")]
pub struct DuplicateLineError(pub ProductId);

/// Canonical cart contents.
///
/// Invariants: every quantity is at least one and no product appears on two
/// lines. Line order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCartState")]
pub struct CartState {
    lines: Vec<CartLine>,
    is_open: bool,
}

/// Unvalidated wire form of [`CartState`].
#[derive(Deserialize)]
struct RawCartState {
    #[serde(default)]
    lines: Vec<CartLine>,
    #[serde(default)]
    is_open: bool,
}

impl TryFrom<RawCartState> for CartState {
    type Error = DuplicateLineError;

    fn try_from(raw: RawCartState) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(raw.lines.len());
        for line in &raw.lines {
            if !seen.insert(line.product_id()) {
                return Err(DuplicateLineError(line.product_id().clone()));
            }
        }

        Ok(Self {
            lines: raw.lines,
            is_open: raw.is_open,
        })
    }
}

impl CartState {
    /// An empty, closed cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            is_open: false,
        }
    }

    /// Apply one action, producing the next state.
    #[must_use]
    pub fn reduce(mut self, action: &CartAction) -> Self {
        match action {
            CartAction::AddItem(product) => match self.line_mut(&product.id) {
                Some(line) => line.increment(),
                None => self.lines.push(CartLine::new(Product::clone(product))),
            },
            CartAction::RemoveItem(product_id) => self.remove_line(product_id),
            CartAction::UpdateQuantity {
                product_id,
                quantity,
            } => {
                // Negative values fail the conversion and count as zero.
                let clamped =
                    u32::try_from(*quantity).unwrap_or(if *quantity > 0 { u32::MAX } else { 0 });
                match NonZeroU32::new(clamped) {
                    None => self.remove_line(product_id),
                    Some(quantity) => {
                        if let Some(line) = self.line_mut(product_id) {
                            line.set_quantity(quantity);
                        }
                    }
                }
            }
            CartAction::ClearCart => self.lines.clear(),
            CartAction::ToggleCart => self.is_open = !self.is_open,
            CartAction::SetCartOpen(is_open) => self.is_open = *is_open,
        }
        self
    }

    /// Lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart drawer is visible.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line for `product_id`, if any.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }

    /// Unit price times quantity for the line holding `product_id`.
    #[must_use]
    pub fn line_total(&self, product_id: &ProductId) -> Option<Decimal> {
        self.line(product_id).map(CartLine::total)
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity()))
            .sum()
    }

    /// Sum of unit price times quantity over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::total).sum()
    }

    /// Owned copy of the contents for order submission.
    #[must_use]
    pub fn snapshot(&self) -> OrderSnapshot {
        OrderSnapshot {
            lines: self
                .lines
                .iter()
                .map(|line| SnapshotLine {
                    product_id: line.product_id().clone(),
                    quantity: line.quantity(),
                    unit_price: line.unit_price(),
                })
                .collect(),
            total_items: self.total_items(),
            total_price: self.total_price(),
        }
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id() == product_id)
    }

    fn remove_line(&mut self, product_id: &ProductId) {
        self.lines.retain(|line| line.product_id() != product_id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Decimal::new(price, 0),
            original_price: None,
            image: format!("https://cdn.example.com/{id}.jpg"),
            brand: "Acme".to_string(),
            category: "Audio".to_string(),
            description: String::new(),
            features: Vec::new(),
            rating: 4.0,
            review_count: 0,
            in_stock: true,
            tags: Vec::new(),
        }
    }

    fn add(id: &str, price: i64) -> CartAction {
        CartAction::AddItem(Box::new(product(id, price)))
    }

    fn apply(state: CartState, actions: &[CartAction]) -> CartState {
        actions.iter().fold(state, CartState::reduce)
    }

    fn quantities(state: &CartState) -> Vec<(&str, u32)> {
        state
            .lines()
            .iter()
            .map(|line| (line.product_id().as_str(), line.quantity()))
            .collect()
    }

    #[test]
    fn test_new_state_is_empty_and_closed() {
        let state = CartState::new();
        assert!(state.is_empty());
        assert!(!state.is_open());
        assert_eq!(state.total_items(), 0);
        assert_eq!(state.total_price(), Decimal::ZERO);
        assert_eq!(state, CartState::default());
    }

    #[test]
    fn test_add_merges_same_product() {
        let state = apply(CartState::new(), &[add("a", 10), add("b", 20), add("a", 10)]);

        assert_eq!(quantities(&state), vec![("a", 2), ("b", 1)]);
        assert_eq!(state.total_items(), 3);
        assert_eq!(state.total_price(), Decimal::new(40, 0));
    }

    #[test]
    fn test_add_keeps_price_captured_on_first_add() {
        // The second add carries a newer price; the line keeps the original.
        let state = apply(CartState::new(), &[add("a", 10), add("a", 99)]);

        let line = state.line(&ProductId::new("a")).unwrap();
        assert_eq!(line.quantity(), 2);
        assert_eq!(line.unit_price(), Decimal::new(10, 0));
        assert_eq!(state.total_price(), Decimal::new(20, 0));
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let state = apply(
            CartState::new(),
            &[
                add("a", 10),
                add("b", 20),
                add("a", 10),
                CartAction::UpdateQuantity {
                    product_id: ProductId::new("b"),
                    quantity: 3,
                },
            ],
        );

        assert_eq!(quantities(&state), vec![("a", 2), ("b", 3)]);
        assert_eq!(state.total_price(), Decimal::new(80, 0));
        assert_eq!(
            state.line_total(&ProductId::new("b")),
            Some(Decimal::new(60, 0))
        );
        assert_eq!(state.line_total(&ProductId::new("z")), None);
    }

    #[test]
    fn test_update_quantity_zero_and_negative_remove_line() {
        for quantity in [0, -5, i64::MIN] {
            let state = apply(
                CartState::new(),
                &[
                    add("a", 10),
                    add("b", 20),
                    CartAction::UpdateQuantity {
                        product_id: ProductId::new("a"),
                        quantity,
                    },
                ],
            );
            assert_eq!(quantities(&state), vec![("b", 1)], "quantity {quantity}");
        }
    }

    #[test]
    fn test_update_quantity_unknown_product_is_noop() {
        let before = apply(CartState::new(), &[add("a", 10)]);
        let after = before.clone().reduce(&CartAction::UpdateQuantity {
            product_id: ProductId::new("missing"),
            quantity: 4,
        });
        assert_eq!(before, after);
    }

    #[test]
    fn test_update_quantity_clamps_to_u32_max() {
        let state = apply(
            CartState::new(),
            &[
                add("a", 1),
                CartAction::UpdateQuantity {
                    product_id: ProductId::new("a"),
                    quantity: i64::MAX,
                },
            ],
        );
        assert_eq!(state.lines()[0].quantity(), u32::MAX);
        assert_eq!(state.total_items(), u64::from(u32::MAX));
    }

    #[test]
    fn test_remove_unknown_product_is_noop() {
        let before = apply(CartState::new(), &[add("a", 10), add("b", 20)]);
        let after = before
            .clone()
            .reduce(&CartAction::RemoveItem(ProductId::new("zzz")));
        assert_eq!(before, after);
    }

    #[test]
    fn test_remove_keeps_order_of_remaining_lines() {
        let state = apply(
            CartState::new(),
            &[
                add("a", 1),
                add("b", 1),
                add("c", 1),
                CartAction::RemoveItem(ProductId::new("b")),
            ],
        );
        assert_eq!(quantities(&state), vec![("a", 1), ("c", 1)]);
    }

    #[test]
    fn test_clear_leaves_visibility_untouched() {
        let state = apply(
            CartState::new(),
            &[add("a", 10), CartAction::SetCartOpen(true), CartAction::ClearCart],
        );
        assert!(state.is_empty());
        assert!(state.is_open());
    }

    #[test]
    fn test_visibility_transitions() {
        let state = CartState::new().reduce(&CartAction::ToggleCart);
        assert!(state.is_open());
        let state = state.reduce(&CartAction::ToggleCart);
        assert!(!state.is_open());
        let state = state.reduce(&CartAction::SetCartOpen(true));
        let state = state.reduce(&CartAction::SetCartOpen(true));
        assert!(state.is_open());
        let state = state.reduce(&CartAction::SetCartOpen(false));
        assert!(!state.is_open());
    }

    #[test]
    fn test_visibility_does_not_touch_lines() {
        let before = apply(CartState::new(), &[add("a", 10)]);
        let after = before.clone().reduce(&CartAction::ToggleCart);
        assert_eq!(before.lines(), after.lines());
    }

    #[test]
    fn test_snapshot_matches_state() {
        let state = apply(CartState::new(), &[add("a", 10), add("b", 20), add("b", 20)]);
        let snapshot = state.snapshot();

        assert_eq!(snapshot.total_items, 3);
        assert_eq!(snapshot.total_price, Decimal::new(50, 0));
        assert_eq!(snapshot.lines.len(), 2);
        assert_eq!(snapshot.lines[1].product_id, ProductId::new("b"));
        assert_eq!(snapshot.lines[1].quantity, 2);
        assert_eq!(snapshot.lines[1].unit_price, Decimal::new(20, 0));
    }

    #[test]
    fn test_serde_round_trip_preserves_state() {
        let state = apply(
            CartState::new(),
            &[add("a", 10), add("a", 10), CartAction::ToggleCart],
        );
        let json = serde_json::to_string(&state).unwrap();
        let back: CartState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_deserialize_rejects_duplicate_lines() {
        let line = serde_json::to_value(CartLine::new(product("a", 10))).unwrap();
        let json = serde_json::json!({ "lines": [line.clone(), line], "is_open": false });

        let err = serde_json::from_value::<CartState>(json).unwrap_err();
        assert!(err.to_string().contains("duplicate cart line for product a"));
    }

    #[test]
    fn test_deserialize_rejects_zero_quantity() {
        let mut line = serde_json::to_value(CartLine::new(product("a", 10))).unwrap();
        line["quantity"] = serde_json::json!(0);
        let json = serde_json::json!({ "lines": [line] });

        assert!(serde_json::from_value::<CartState>(json).is_err());
    }

    fn action_strategy() -> impl Strategy<Value = CartAction> {
        let id = prop::sample::select(vec!["a", "b", "c", "d"]);
        prop_oneof![
            4 => (id.clone(), 1i64..500).prop_map(|(id, price)| add(id, price)),
            1 => id.clone().prop_map(|id| CartAction::RemoveItem(ProductId::new(id))),
            2 => (id, -3i64..10).prop_map(|(id, quantity)| CartAction::UpdateQuantity {
                product_id: ProductId::new(id),
                quantity,
            }),
            1 => Just(CartAction::ClearCart),
            1 => Just(CartAction::ToggleCart),
            1 => any::<bool>().prop_map(CartAction::SetCartOpen),
        ]
    }

    proptest! {
        #[test]
        fn prop_invariants_hold_after_every_action(
            actions in prop::collection::vec(action_strategy(), 0..64)
        ) {
            let mut state = CartState::new();
            for action in &actions {
                state = state.reduce(action);

                let mut ids = HashSet::new();
                for line in state.lines() {
                    prop_assert!(line.quantity() >= 1);
                    prop_assert!(ids.insert(line.product_id().clone()));
                }

                let items: u64 = state.lines().iter().map(|l| u64::from(l.quantity())).sum();
                let price: Decimal = state
                    .lines()
                    .iter()
                    .map(|l| l.unit_price() * Decimal::from(l.quantity()))
                    .sum();
                prop_assert_eq!(state.total_items(), items);
                prop_assert_eq!(state.total_price(), price);
            }
        }

        #[test]
        fn prop_repeated_add_accumulates(n in 1usize..200) {
            let actions = vec![add("a", 7); n];
            let state = apply(CartState::new(), &actions);
            prop_assert_eq!(state.lines().len(), 1);
            prop_assert_eq!(state.lines()[0].quantity() as usize, n);
        }
    }
}
