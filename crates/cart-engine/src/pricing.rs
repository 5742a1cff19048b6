//! Order summary calculation.
//!
//! The summary is derived from cart items and the applied discount on every
//! read and never stored. The step order matters: a shipping discount zeroes
//! shipping, and the reported discount for it is the fee that would
//! otherwise have been charged.

use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::discount::{AppliedDiscount, DiscountValue};
use crate::money::Money;

/// Shipping, threshold and tax settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    /// Subtotals strictly above this ship free.
    pub free_shipping_threshold: Money,
    /// Flat shipping fee charged otherwise.
    pub flat_shipping: Money,
    /// Sales tax rate in basis points (850 = 8.5%).
    pub tax_rate_bps: u32,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::new(7_500),
            flat_shipping: Money::new(999),
            tax_rate_bps: 850,
        }
    }
}

impl PricingPolicy {
    /// Shipping fee for a subtotal before any discount.
    pub fn base_shipping(&self, subtotal: Money) -> Money {
        if subtotal > self.free_shipping_threshold {
            Money::zero()
        } else {
            self.flat_shipping
        }
    }

    /// Derive the order summary.
    pub fn summarize(
        &self,
        items: &[CartItem],
        applied_discount: Option<&AppliedDiscount>,
    ) -> OrderSummary {
        let subtotal: Money = items.iter().map(CartItem::line_total).sum();

        let base_shipping = self.base_shipping(subtotal);
        let free_shipping = matches!(
            applied_discount.map(|d| d.value),
            Some(DiscountValue::Shipping)
        );
        let shipping = if free_shipping {
            Money::zero()
        } else {
            base_shipping
        };

        let merchandise_discount = applied_discount
            .map(|d| d.value.merchandise_discount(subtotal))
            .unwrap_or_default();
        // Computed from the pre-discount fee, not the zeroed `shipping`.
        let discount = if free_shipping {
            base_shipping
        } else {
            merchandise_discount
        };

        let taxable = (subtotal - merchandise_discount).non_negative();
        let tax = taxable.basis_points(self.tax_rate_bps);
        let total = (subtotal + shipping + tax - merchandise_discount).non_negative();
        let item_count = items.iter().map(|item| item.quantity).sum();

        OrderSummary {
            subtotal,
            shipping,
            tax,
            discount,
            total,
            item_count,
            applied_discount: applied_discount.cloned(),
        }
    }
}

/// Complete pricing breakdown for the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    /// Sum of line totals.
    pub subtotal: Money,
    /// Shipping charged.
    pub shipping: Money,
    /// Tax on the discounted subtotal.
    pub tax: Money,
    /// Savings reported for the applied discount.
    pub discount: Money,
    /// Amount due.
    pub total: Money,
    /// Sum of quantities.
    pub item_count: u32,
    /// The discount in effect, if any.
    pub applied_discount: Option<AppliedDiscount>,
}

impl OrderSummary {
    /// Savings from the applied discount.
    pub fn savings(&self) -> Money {
        self.discount
    }

    /// Check if a discount is applied.
    pub fn has_discount(&self) -> bool {
        self.applied_discount.is_some()
    }

    /// Check if the order ships free.
    pub fn ships_free(&self) -> bool {
        self.shipping.is_zero()
    }
}
