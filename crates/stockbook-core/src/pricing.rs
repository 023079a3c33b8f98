//! # Pricing Resolver
//!
//! Turns a requested sale line into a quantity, a unit price and a line total.
//!
//! ## Input Types by Mode
//! ```text
//! ┌───────────────┬────────────────────────┬──────────────────────────────┐
//! │ Pricing mode  │ input_type             │ Meaning of `value`           │
//! ├───────────────┼────────────────────────┼──────────────────────────────┤
//! │ WEIGHT        │ "weight"               │ grams to sell                │
//! │ WEIGHT        │ "price"                │ amount the customer wants    │
//! │ FIXED         │ "quantity"             │ pieces to sell               │
//! │ FIXED         │ "price"                │ amount the customer wants    │
//! │ anything else │                        │ InvalidInput                 │
//! └───────────────┴────────────────────────┴──────────────────────────────┘
//! ```
//!
//! ## Rounding
//! - Line totals and line costs are rounded to 2 places (half to even).
//! - A quantity derived from a target price is rounded to 3 places.
//! - Unit prices are never rounded.

use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{Item, ItemPricing, PricingMode};

/// What the `value` of a sale line request means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineInput {
    /// Sell this many grams.
    Weight(Quantity),
    /// Sell this many pieces.
    Quantity(Quantity),
    /// Sell as much as this amount buys.
    Price(Money),
}

impl LineInput {
    /// Interprets a raw `(input_type, value)` pair.
    pub fn parse(input_type: &str, value: Decimal) -> CoreResult<Self> {
        match input_type.trim().to_ascii_lowercase().as_str() {
            "weight" => Ok(LineInput::Weight(Quantity::new(value))),
            "quantity" => Ok(LineInput::Quantity(Quantity::new(value))),
            "price" => Ok(LineInput::Price(Money::new(value))),
            other => Err(CoreError::invalid_input(format!("unknown input type '{other}'"))),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            LineInput::Weight(_) => "weight",
            LineInput::Quantity(_) => "quantity",
            LineInput::Price(_) => "price",
        }
    }
}

/// The outcome of pricing one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    /// In the item's natural unit.
    pub quantity: Quantity,
    pub unit_price: Money,
    pub line_total: Money,
    /// `unit_cost × quantity`, rounded.
    pub line_cost: Money,
}

/// Prices one line of a sale.
///
/// ## Example
/// ```rust
/// use rust_decimal_macros::dec;
/// use stockbook_core::money::Money;
/// use stockbook_core::pricing::{price_line, LineInput};
/// use stockbook_core::quantity::Quantity;
/// use stockbook_core::types::ItemPricing;
///
/// let almonds = ItemPricing::Weight {
///     price_per_kg: Money::new(dec!(1000)),
///     cost_per_kg: Money::new(dec!(600)),
/// };
/// let line = price_line(&almonds, LineInput::Weight(Quantity::new(dec!(500)))).unwrap();
/// assert_eq!(line.line_total.amount(), dec!(500));
/// assert_eq!(line.line_cost.amount(), dec!(300));
/// ```
pub fn price_line(pricing: &ItemPricing, input: LineInput) -> CoreResult<PricedLine> {
    let unit_price = pricing.unit_price();
    let unit_cost = pricing.unit_cost();
    let times = |unit: Money, qty: Quantity, what: &str| {
        unit.checked_mul(qty)
            .map(|m| m.round())
            .ok_or_else(|| CoreError::out_of_range(what))
    };

    let (quantity, line_total) = match (pricing.mode(), input) {
        (PricingMode::Weight, LineInput::Weight(grams)) => (grams, times(unit_price, grams, "line total")?),
        (PricingMode::Fixed, LineInput::Quantity(pieces)) => (pieces, times(unit_price, pieces, "line total")?),
        (_, LineInput::Price(amount)) => {
            let line_total = amount.round();
            let quantity = if unit_price.is_positive() {
                line_total
                    .amount()
                    .checked_div(unit_price.amount())
                    .map(|q| Quantity::new(q).round())
                    .ok_or_else(|| CoreError::out_of_range("quantity"))?
            } else {
                Quantity::zero()
            };
            (quantity, line_total)
        }
        (mode, other) => {
            return Err(CoreError::invalid_input(format!(
                "input type '{}' is not valid for {} items",
                other.name(),
                mode
            )))
        }
    };

    if !line_total.is_positive() {
        return Err(CoreError::invalid_input("line total must be greater than zero"));
    }
    if !quantity.is_positive() {
        return Err(CoreError::invalid_input("quantity must be greater than zero"));
    }

    Ok(PricedLine {
        quantity,
        unit_price,
        line_total,
        line_cost: times(unit_cost, quantity, "line cost")?,
    })
}

/// Parses and prices a raw request line for `item`.
pub fn price_request(item: &Item, input_type: &str, value: Decimal) -> CoreResult<PricedLine> {
    let input = LineInput::parse(input_type, value)?;
    price_line(&item.pricing, input)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn almonds() -> ItemPricing {
        ItemPricing::Weight {
            price_per_kg: Money::new(dec!(1000)),
            cost_per_kg: Money::new(dec!(600)),
        }
    }

    fn soda() -> ItemPricing {
        ItemPricing::Fixed {
            price_per_unit: Money::new(dec!(50)),
            cost_per_unit: Money::new(dec!(30)),
        }
    }

    #[test]
    fn test_weight_by_grams() {
        let line = price_line(&almonds(), LineInput::Weight(Quantity::new(dec!(500)))).unwrap();
        assert_eq!(line.quantity.value(), dec!(500));
        assert_eq!(line.unit_price.amount(), dec!(1));
        assert_eq!(line.line_total.amount(), dec!(500));
        assert_eq!(line.line_cost.amount(), dec!(300));
    }

    #[test]
    fn test_weight_by_price() {
        let pricing = ItemPricing::Weight {
            price_per_kg: Money::new(dec!(1200)),
            cost_per_kg: Money::new(dec!(900)),
        };
        let line = price_line(&pricing, LineInput::Price(Money::new(dec!(100)))).unwrap();
        // 100 / 1.2 = 83.333…
        assert_eq!(line.quantity.value(), dec!(83.333));
        assert_eq!(line.line_total.amount(), dec!(100));
        // 83.333 × 0.9 = 74.9997
        assert_eq!(line.line_cost.amount(), dec!(75.00));
    }

    #[test]
    fn test_fixed_by_quantity() {
        let line = price_line(&soda(), LineInput::Quantity(Quantity::new(dec!(3)))).unwrap();
        assert_eq!(line.line_total.amount(), dec!(150));
        assert_eq!(line.line_cost.amount(), dec!(90));
    }

    #[test]
    fn test_fixed_by_price() {
        let line = price_line(&soda(), LineInput::Price(Money::new(dec!(125)))).unwrap();
        assert_eq!(line.quantity.value(), dec!(2.5));
    }

    #[test]
    fn test_mode_mismatch_is_invalid_input() {
        let err = price_line(&almonds(), LineInput::Quantity(Quantity::new(dec!(1)))).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { .. }));

        let err = price_line(&soda(), LineInput::Weight(Quantity::new(dec!(1)))).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { .. }));
    }

    #[test]
    fn test_unknown_input_type() {
        assert!(LineInput::parse("volume", dec!(1)).is_err());
        assert_eq!(
            LineInput::parse(" Weight ", dec!(1)).unwrap(),
            LineInput::Weight(Quantity::new(dec!(1)))
        );
    }

    #[test]
    fn test_non_positive_results_rejected() {
        assert!(price_line(&almonds(), LineInput::Weight(Quantity::zero())).is_err());
        assert!(price_line(&almonds(), LineInput::Price(Money::new(dec!(-5)))).is_err());
    }

    #[test]
    fn test_free_item_priced_by_amount_has_no_quantity() {
        let free = ItemPricing::Fixed {
            price_per_unit: Money::zero(),
            cost_per_unit: Money::zero(),
        };
        let err = price_line(&free, LineInput::Price(Money::new(dec!(10)))).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { .. }));
    }

    #[test]
    fn test_tiny_weight_rounds_total_to_zero() {
        // 0.001 g at 1/g is 0.001 → 0.00
        let err = price_line(&almonds(), LineInput::Weight(Quantity::new(dec!(0.001)))).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { .. }));
    }

    #[test]
    fn test_overflowing_weight_is_out_of_range() {
        let pricing = ItemPricing::Weight {
            price_per_kg: Money::new(dec!(2000)),
            cost_per_kg: Money::new(dec!(1500)),
        };
        let err = price_line(&pricing, LineInput::Weight(Quantity::new(Decimal::MAX))).unwrap_err();
        assert!(matches!(err, CoreError::AmountOutOfRange { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_price_over_tiny_unit_price_is_out_of_range() {
        let dust = ItemPricing::Fixed {
            price_per_unit: Money::new(Decimal::new(1, 27)),
            cost_per_unit: Money::zero(),
        };
        let err = price_line(&dust, LineInput::Price(Money::new(dec!(1000000)))).unwrap_err();
        assert!(matches!(err, CoreError::AmountOutOfRange { .. }));
    }
}
