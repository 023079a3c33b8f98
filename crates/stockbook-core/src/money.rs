//! # Money Module
//!
//! Provides the `Money` type for monetary values.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Weight pricing makes it worse:                                         │
//! │    price per kg 1250 → per gram 1.25 → 333 g = 416.25                  │
//! │    Integer cents cannot hold a per-gram price of 0.0125                │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal                                             │
//! │    Exact base-10 arithmetic, 28 significant digits                     │
//! │    Round explicitly, and only where a figure is final                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unit prices keep their full precision. Line totals, line costs, sale
//! totals and platform charges are rounded to [`MONEY_SCALE`] decimal places
//! with Bankers Rounding via [`Money::round`].
//!
//! ## Usage
//! ```rust
//! use rust_decimal_macros::dec;
//! use stockbook_core::money::Money;
//!
//! let per_kg = Money::new(dec!(1250));
//! let per_gram = per_kg.per_thousand();
//! assert_eq!(per_gram.amount(), dec!(1.25));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use crate::quantity::Quantity;

/// Decimal places kept on final monetary figures.
pub const MONEY_SCALE: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A single-currency monetary amount.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Item.price_per_kg ──► unit price per gram ──► SaleLine.line_total     │
/// │                                                        │                │
/// │  Item.cost_per_kg  ──► unit cost per gram  ──► line cost│               │
/// │                                                        ▼                │
/// │            Sale.total, Sale.total_cost, Sale.profit, platform charge   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is strictly greater than zero.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is below zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Rounds to [`MONEY_SCALE`] places using Bankers Rounding.
    ///
    /// ```text
    /// 0.125 → 0.12    0.135 → 0.14    0.1251 → 0.13
    /// ```
    pub fn round(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// Divides by one thousand, e.g. a per-kilogram price to a per-gram price.
    ///
    /// The result is not rounded.
    pub fn per_thousand(&self) -> Money {
        Money(self.0 / Decimal::ONE_THOUSAND)
    }

    /// Takes `percent` percent of this amount, rounded. `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal_macros::dec;
    /// use stockbook_core::money::Money;
    ///
    /// let total = Money::new(dec!(1000));
    /// assert_eq!(total.checked_percentage(dec!(10)).unwrap().amount(), dec!(100));
    /// ```
    pub fn checked_percentage(&self, percent: Decimal) -> Option<Money> {
        self.0
            .checked_mul(percent)
            .map(|scaled| Money(scaled / Decimal::ONE_HUNDRED).round())
    }

    /// Multiplies by a plain count (used for per-line fees). `None` on overflow.
    pub fn checked_times(&self, count: usize) -> Option<Money> {
        self.0.checked_mul(Decimal::from(count)).map(Money)
    }

    /// Unit price × quantity, not rounded. `None` on overflow.
    pub fn checked_mul(&self, qty: Quantity) -> Option<Money> {
        self.0.checked_mul(qty.value()).map(Money)
    }

    /// `self + other`, or `None` on overflow.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
