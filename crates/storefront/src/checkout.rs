//! Checkout: delivery form validation, price summary and order assembly.
//!
//! Tax is a flat percentage of the subtotal and shipping is always free.
//! The order request lists one product ID per unit ordered.

use chrono::{DateTime, Utc};
use marketstall_core::{CurrencyCode, Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::api::types::{PlaceOrderRequest, WireDeliveryDetails};
use crate::cart::{CartState, OrderSnapshot};

/// Tax percentage applied when none is configured.
pub const DEFAULT_TAX_RATE_PERCENT: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Most units one order may contain.
///
/// The order request lists every unit separately, so the payload grows with
/// the quantity ordered.
pub const MAX_ORDER_UNITS: u64 = 1_000;

/// Errors raised before an order is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// A required delivery field is blank.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// There is nothing to order.
    #[error("Cart is empty")]
    EmptyCart,

    /// The cart holds more units than one order accepts.
    #[error("Order has {units} items; at most {max} can be ordered at once")]
    TooManyUnits { units: u64, max: u64 },
}

/// Delivery form fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone_number: String,
}

impl DeliveryDetails {
    /// Check that every field is filled in.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::MissingField` naming the first blank field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        let fields = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("address", &self.address),
            ("phone_number", &self.phone_number),
        ];

        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some(&(name, _)) => Err(CheckoutError::MissingField(name)),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// Shipping method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shipping {
    #[default]
    Free,
}

impl Shipping {
    #[must_use]
    pub const fn cost(self) -> Decimal {
        match self {
            Self::Free => Decimal::ZERO,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
        }
    }
}

/// Subtotal, tax and total for a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceSummary {
    pub sub_total: Decimal,
    pub tax_rate_percent: Decimal,
    pub tax_amount: Decimal,
    pub shipping: Shipping,
    pub total: Decimal,
}

impl PriceSummary {
    /// Price a snapshot. Tax is rounded to two decimal places.
    #[must_use]
    pub fn from_snapshot(snapshot: &OrderSnapshot, tax_rate_percent: Decimal) -> Self {
        let sub_total = snapshot.total_price;
        let tax_amount = (sub_total * tax_rate_percent / Decimal::ONE_HUNDRED).round_dp(2);
        let shipping = Shipping::Free;

        Self {
            sub_total,
            tax_rate_percent,
            tax_amount,
            shipping,
            total: sub_total + tax_amount + shipping.cost(),
        }
    }

    /// Formatted amounts for display.
    #[must_use]
    pub fn view(&self, currency: CurrencyCode) -> PriceSummaryView {
        PriceSummaryView {
            sub_total: Price::new(self.sub_total, currency).display(),
            tax: Price::new(self.tax_amount, currency).display(),
            shipping: self.shipping.as_str().to_string(),
            total: Price::new(self.total, currency).display(),
        }
    }
}

/// Display strings for a [`PriceSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceSummaryView {
    pub sub_total: String,
    pub tax: String,
    pub shipping: String,
    pub total: String,
}

/// Assemble the order submission payload.
///
/// # Errors
///
/// Returns `CheckoutError::MissingField` if the delivery details are
/// incomplete, `CheckoutError::EmptyCart` if the snapshot has no lines, or
/// `CheckoutError::TooManyUnits` if it holds more than [`MAX_ORDER_UNITS`].
pub fn order_request(
    details: &DeliveryDetails,
    snapshot: &OrderSnapshot,
    summary: &PriceSummary,
) -> Result<PlaceOrderRequest, CheckoutError> {
    details.validate()?;
    if snapshot.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let units = snapshot.unit_count();
    if units > MAX_ORDER_UNITS {
        return Err(CheckoutError::TooManyUnits {
            units,
            max: MAX_ORDER_UNITS,
        });
    }

    Ok(PlaceOrderRequest {
        delivery: WireDeliveryDetails::from(details),
        sub_total: summary.sub_total,
        shipping: summary.shipping,
        tax: summary.tax_rate_percent,
        product_ids: snapshot.unit_product_ids().cloned().collect(),
    })
}

/// One ordered line in an [`OrderConfirmation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationLine {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    pub line_total: String,
}

/// What the shopper sees after an order is accepted.
#[derive(Debug, Clone, Serialize)]
pub struct OrderConfirmation {
    /// Local reference for support and log correlation.
    pub reference: Uuid,
    pub placed_at: DateTime<Utc>,
    pub message: String,
    pub delivery: DeliveryDetails,
    pub items: Vec<ConfirmationLine>,
    pub summary: PriceSummary,
    pub display: PriceSummaryView,
}

impl OrderConfirmation {
    /// Build a confirmation from the cart as it was when the order was sent.
    #[must_use]
    pub fn new(
        cart: &CartState,
        delivery: DeliveryDetails,
        summary: PriceSummary,
        message: String,
        currency: CurrencyCode,
    ) -> Self {
        let items = cart
            .lines()
            .iter()
            .map(|line| ConfirmationLine {
                product_id: line.product_id().clone(),
                name: line.product().name.clone(),
                image: line.product().image.clone(),
                quantity: line.quantity(),
                line_total: Price::new(line.total(), currency).display(),
            })
            .collect();

        Self {
            reference: Uuid::new_v4(),
            placed_at: Utc::now(),
            message,
            delivery,
            items,
            display: summary.view(currency),
            summary,
        }
    }
}
