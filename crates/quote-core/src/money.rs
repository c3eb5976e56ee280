//! # Money Module
//!
//! Provides the `Money` type: the display boundary for monetary values.
//!
//! ## Exact Inside, Rounded Outside
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE COMPOUNDING PROBLEM                                                │
//! │                                                                         │
//! │  Round on every edit:                                                   │
//! │    price 554.95 → margin% 19.998.. → round → price 554.94  ❌ DRIFT     │
//! │                                                                         │
//! │  OUR SOLUTION: the engine keeps exact f64 values, and only             │
//! │  Money (integer paise) crosses into documents and totals display.      │
//! │    Money::from_amount(554.9472) = 55495 paise = ₹554.95                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use quote_core::money::Money;
//!
//! let price = Money::from_amount(554.9472);
//! assert_eq!(price.paise(), 55495);
//! assert_eq!(price.to_string(), "₹554.95");
//!
//! let line = price.multiply_quantity(3.0);
//! assert_eq!(line.to_string(), "₹1,664.85");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

use crate::types::TaxRate;

/// Currency symbol used by [`Money`]'s `Display` implementation.
pub const CURRENCY_SYMBOL: &str = "₹";

/// Rounds an exact amount to two decimal places, half away from zero.
///
/// ## Example
/// ```rust
/// use quote_core::money::round2;
///
/// assert_eq!(round2(462.4578), 462.46);
/// assert_eq!(round2(-0.005), -0.01);
/// ```
#[inline]
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise for INR).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for loss-leader rows
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Only built at the display boundary**: the pricing engine works on
///   exact `f64` values and converts once, here
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from an exact engine amount, rounding to the
    /// nearest paisa (half away from zero). Non-finite input becomes zero.
    ///
    /// ## Example
    /// ```rust
    /// use quote_core::money::Money;
    ///
    /// assert_eq!(Money::from_amount(453.39).paise(), 45339);
    /// assert_eq!(Money::from_amount(f64::NAN), Money::zero());
    /// ```
    pub fn from_amount(amount: f64) -> Self {
        if !amount.is_finite() {
            return Money::zero();
        }
        Money((amount * 100.0).round() as i64)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the value as a two-decimal amount.
    #[inline]
    pub fn amount(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Calculates tax on this amount.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`, which rounds half up
    /// for positive amounts.
    ///
    /// ## Example
    /// ```rust
    /// use quote_core::money::Money;
    /// use quote_core::types::TaxRate;
    ///
    /// let value = Money::from_paise(36_000_00); // ₹36,000.00
    /// let gst = value.calculate_tax(TaxRate::from_bps(1800));
    /// assert_eq!(gst.paise(), 6_480_00);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_paise = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_paise(tax_paise as i64)
    }

    /// Multiplies money by a (possibly fractional) quantity, rounding to
    /// the nearest paisa.
    pub fn multiply_quantity(&self, qty: f64) -> Self {
        Money::from_amount(self.amount() * qty)
    }

    /// Formats the rupee part with Indian digit grouping
    /// (`12,34,567`): the last three digits, then pairs.
    fn grouped_rupees(&self) -> String {
        let digits = self.rupees().abs().to_string();
        if digits.len() <= 3 {
            return digits;
        }

        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(2);
            groups.push(&head[start..end]);
            end = start;
        }
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `₹1,23,456.78` (en-IN grouping).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}{}.{:02}",
            sign,
            CURRENCY_SYMBOL,
            self.grouped_rupees(),
            self.paise_part()
        )
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

// =============================================================================
// Unit Tests
// =============================================================================
