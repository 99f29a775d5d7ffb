//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Cost floor with floats:                                                │
//! │    0.1 × 3 = 0.30000000000000004                                        │
//! │    remove the component again → cost = 4e-17, or -4e-17  ❌           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Each component cost is rounded to whole cents ONCE.                  │
//! │    Sums and differences of cents are exact.                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Material quantities (metres of fabric, grams of resin) stay fractional;
//! only the product `cents × quantity` is rounded, via [`Money::scale`].
//!
//! ## Usage
//! ```rust
//! use kiosko_core::money::Money;
//!
//! let fabric_per_metre = Money::from_cents(1000); // $10.00
//! let cost = fabric_per_metre.scale(2.5);         // 2.5 m
//! assert_eq!(cost.cents(), 2500);
//!
//! let price = Money::from_cents(5000);
//! assert_eq!((price - cost).cents(), 2500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: profit can be negative in intermediate arithmetic
/// - **Single field tuple struct**: Zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Material.cost_cents × Component.quantity ──► Product cost floor        │
/// │                                                                         │
/// │  Product.price_cents × qty ──► SaleLine total ──► Sale.total_cents      │
/// │                                                                         │
/// │  (price - cost) × qty ──► SaleLine.profit_cents ──► Sale.profit_cents   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use kiosko_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Clamps negative values to zero.
    ///
    /// ## Example
    /// ```rust
    /// use kiosko_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-3).clamp_non_negative(), Money::zero());
    /// assert_eq!(Money::from_cents(7).clamp_non_negative().cents(), 7);
    /// ```
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Multiplies money by a whole quantity (units sold).
    ///
    /// Saturates at the `i64` bounds. Use [`Money::checked_multiply_quantity`]
    /// where an out-of-range amount must be rejected.
    ///
    /// ## Example
    /// ```rust
    /// use kiosko_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// `self × qty`, or `None` if the result does not fit in cents.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `self + other`, or `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `self + other`, pinned to the `i64` bounds.
    ///
    /// Cost sums use this: an amount too large to represent is still larger
    /// than any sale price, so the price check rejects it.
    #[inline]
    pub const fn saturating_add(&self, other: Money) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    /// Multiplies money by a fractional quantity and rounds to whole cents.
    ///
    /// Rounding is half away from zero (`f64::round`), applied once per
    /// component so the component cost is stable wherever it is summed.
    /// Results outside the `i64` range saturate.
    ///
    /// ## Example
    /// ```rust
    /// use kiosko_core::money::Money;
    ///
    /// let per_gram = Money::from_cents(3);
    /// assert_eq!(per_gram.scale(0.5).cents(), 2);   // 1.5 → 2
    /// assert_eq!(per_gram.scale(12.0).cents(), 36);
    /// ```
    pub fn scale(&self, factor: f64) -> Money {
        Money((self.0 as f64 * factor).round() as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display is for debugging and logs; the UI formats for its locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Saturating, like [`Money::saturating_add`].
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc.saturating_add(m))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
