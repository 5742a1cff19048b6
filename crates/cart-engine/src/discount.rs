//! Discount codes: rule shapes, the static catalog, and applied snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CartError;
use crate::money::Money;

/// Type of discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// Percentage off the subtotal.
    Percentage,
    /// Fixed amount off the subtotal.
    Fixed,
    /// Shipping fee waived.
    Shipping,
}

/// Value of the discount.
///
/// Serialized flat as `{ "type": ..., "value": ... }`. Percentages are read
/// as plain numbers (`12.5`) and held in basis points; shipping rules carry
/// `value: 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDiscountValue", into = "RawDiscountValue")]
pub enum DiscountValue {
    /// Percent off, in basis points (1250 = 12.5%).
    Percentage(u32),
    /// Fixed amount off.
    Fixed(Money),
    /// Free shipping.
    Shipping,
}

impl DiscountValue {
    /// The type tag of this value.
    pub fn discount_type(&self) -> DiscountType {
        match self {
            DiscountValue::Percentage(_) => DiscountType::Percentage,
            DiscountValue::Fixed(_) => DiscountType::Fixed,
            DiscountValue::Shipping => DiscountType::Shipping,
        }
    }

    /// The numeric value: percent, dollars, or 0 for shipping.
    pub fn amount(&self) -> f64 {
        match self {
            DiscountValue::Percentage(bps) => f64::from(*bps) / 100.0,
            DiscountValue::Fixed(amount) => amount.to_decimal(),
            DiscountValue::Shipping => 0.0,
        }
    }

    /// Amount taken off the merchandise subtotal.
    ///
    /// Shipping discounts never reduce merchandise; their saving is priced
    /// separately.
    pub fn merchandise_discount(&self, subtotal: Money) -> Money {
        match self {
            DiscountValue::Percentage(bps) => subtotal.basis_points((*bps).min(BASIS_POINTS_MAX)),
            // Don't exceed subtotal
            DiscountValue::Fixed(amount) => (*amount).min(subtotal).non_negative(),
            DiscountValue::Shipping => Money::zero(),
        }
    }
}

const BASIS_POINTS_MAX: u32 = 10_000;

/// Wire form of [`DiscountValue`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawDiscountValue {
    #[serde(rename = "type")]
    kind: DiscountType,
    #[serde(default)]
    value: f64,
}

impl TryFrom<RawDiscountValue> for DiscountValue {
    type Error = String;

    fn try_from(raw: RawDiscountValue) -> Result<Self, Self::Error> {
        if !raw.value.is_finite() || raw.value < 0.0 {
            return Err(format!("discount value must be a non-negative number, got {}", raw.value));
        }
        match raw.kind {
            DiscountType::Percentage if raw.value > 100.0 => {
                Err(format!("percentage must be at most 100, got {}", raw.value))
            }
            DiscountType::Percentage => Ok(DiscountValue::Percentage((raw.value * 100.0).round() as u32)),
            DiscountType::Fixed => Ok(DiscountValue::Fixed(Money::from_decimal(raw.value))),
            DiscountType::Shipping => Ok(DiscountValue::Shipping),
        }
    }
}

impl From<DiscountValue> for RawDiscountValue {
    fn from(value: DiscountValue) -> Self {
        Self {
            kind: value.discount_type(),
            value: value.amount(),
        }
    }
}

/// A discount code definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRule {
    /// Discount code, stored uppercased.
    pub code: String,
    /// Type and value.
    #[serde(flatten)]
    pub value: DiscountValue,
    /// Minimum subtotal required at application time.
    #[serde(default, alias = "min_order")]
    pub min_order: Money,
    /// Description for display.
    pub description: String,
}

impl DiscountRule {
    /// Create a whole-percent-off rule.
    pub fn percentage(code: &str, percent: u32, min_order: Money, description: &str) -> Self {
        Self::new(
            code,
            DiscountValue::Percentage(percent.saturating_mul(100)),
            min_order,
            description,
        )
    }

    /// Create a fixed-amount rule.
    pub fn fixed_amount(code: &str, amount: Money, min_order: Money, description: &str) -> Self {
        Self::new(code, DiscountValue::Fixed(amount), min_order, description)
    }

    /// Create a free-shipping rule.
    pub fn free_shipping(code: &str, min_order: Money, description: &str) -> Self {
        Self::new(code, DiscountValue::Shipping, min_order, description)
    }

    fn new(code: &str, value: DiscountValue, min_order: Money, description: &str) -> Self {
        Self {
            code: normalize_code(code),
            value,
            min_order,
            description: description.to_string(),
        }
    }

    /// The type tag of this rule.
    pub fn discount_type(&self) -> DiscountType {
        self.value.discount_type()
    }
}

/// A discount that has been applied to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedDiscount {
    /// The uppercased code used.
    pub code: String,
    /// Type and value at application time.
    #[serde(flatten)]
    pub value: DiscountValue,
    /// Minimum order the code required.
    pub min_order: Money,
    /// Description for display.
    pub description: String,
}

impl AppliedDiscount {
    /// Snapshot a rule.
    pub fn from_rule(rule: &DiscountRule) -> Self {
        Self {
            code: rule.code.clone(),
            value: rule.value,
            min_order: rule.min_order,
            description: rule.description.clone(),
        }
    }

    /// The type tag of the snapshot.
    pub fn discount_type(&self) -> DiscountType {
        self.value.discount_type()
    }
}

/// Lookup table of discount rules keyed by uppercased code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountCatalog {
    rules: BTreeMap<String, DiscountRule>,
}

impl DiscountCatalog {
    /// The built-in promotional codes.
    pub fn standard() -> Self {
        Self::with_rules([
            DiscountRule::percentage("WELCOME10", 10, Money::zero(), "10% off your order"),
            DiscountRule::percentage("SAVE20", 20, Money::new(10_000), "20% off orders over $100"),
            DiscountRule::fixed_amount(
                "FLAT15",
                Money::new(1_500),
                Money::new(5_000),
                "$15 off orders over $50",
            ),
            DiscountRule::free_shipping("FREESHIP", Money::zero(), "Free shipping on any order"),
        ])
    }

    /// Build a catalog from custom rules. Later rules replace earlier ones with the same code.
    pub fn with_rules(rules: impl IntoIterator<Item = DiscountRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|mut rule| {
                rule.code = normalize_code(&rule.code);
                (rule.code.clone(), rule)
            })
            .collect();
        Self { rules }
    }

    /// Find a rule, ignoring case and surrounding whitespace.
    pub fn lookup(&self, code: &str) -> Option<&DiscountRule> {
        self.rules.get(&normalize_code(code))
    }

    /// All rules, ordered by code.
    pub fn rules(&self) -> impl Iterator<Item = &DiscountRule> {
        self.rules.values()
    }

    /// Validate a code against the current subtotal and snapshot it.
    pub fn apply(&self, code: &str, subtotal: Money) -> Result<AppliedDiscount, CartError> {
        let normalized = normalize_code(code);
        let rule = self
            .rules
            .get(&normalized)
            .ok_or(CartError::InvalidDiscountCode(normalized))?;

        if subtotal < rule.min_order {
            return Err(CartError::DiscountMinimumNotMet {
                code: rule.code.clone(),
                minimum: rule.min_order.display(),
            });
        }

        Ok(AppliedDiscount::from_rule(rule))
    }
}

impl Default for DiscountCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
