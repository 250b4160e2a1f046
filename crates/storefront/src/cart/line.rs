//! Cart line items.

use std::num::NonZeroU32;

use marketstall_core::{Product, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product-to-quantity association in the cart.
///
/// The product snapshot is captured when the line is created; its price is
/// the unit price for the lifetime of the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    product: Product,
    quantity: NonZeroU32,
}

impl CartLine {
    /// Create a line holding a single unit of `product`.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            quantity: NonZeroU32::MIN,
        }
    }

    /// The product snapshot taken at add time.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    #[must_use]
    pub const fn unit_price(&self) -> Decimal {
        self.product.price
    }

    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity.get())
    }

    pub(crate) const fn increment(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    pub(crate) const fn set_quantity(&mut self, quantity: NonZeroU32) {
        self.quantity = quantity;
    }
}
