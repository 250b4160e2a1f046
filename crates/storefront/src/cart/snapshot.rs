//! Immutable cart snapshots for order submission.

use marketstall_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of an [`OrderSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Owned copy of the cart taken at a point in time.
///
/// Totals are computed once, when the snapshot is taken.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub lines: Vec<SnapshotLine>,
    pub total_items: u64,
    pub total_price: Decimal,
}

impl OrderSnapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Units across all lines, counted from the lines themselves.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Product IDs with each ID repeated once per unit, in line order.
    pub fn unit_product_ids(&self) -> impl Iterator<Item = &ProductId> + '_ {
        self.lines.iter().flat_map(|line| {
            std::iter::repeat_n(&line.product_id, line.quantity as usize)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_product_ids_expand_quantities() {
        let snapshot = OrderSnapshot {
            lines: vec![
                SnapshotLine {
                    product_id: ProductId::new("a"),
                    quantity: 2,
                    unit_price: Decimal::new(10, 0),
                },
                SnapshotLine {
                    product_id: ProductId::new("b"),
                    quantity: 1,
                    unit_price: Decimal::new(20, 0),
                },
            ],
            total_items: 3,
            total_price: Decimal::new(40, 0),
        };

        let ids: Vec<&str> = snapshot.unit_product_ids().map(ProductId::as_str).collect();
        assert_eq!(ids, vec!["a", "a", "b"]);
        assert_eq!(snapshot.unit_count(), 3);
    }
}
