//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A quote with 40 lines and chained percentage discounts compounds       │
//! │  that error into visible off-by-one pesos on the printed PDF.           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Pesos                                            │
//! │    Quotes are issued in whole pesos (CLP has no usable minor unit).     │
//! │    All arithmetic is i64 pesos; percentages are integer basis points.   │
//! │    Rounding happens exactly once per aggregate, never mid-chain.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cotizador_core::money::Money;
//!
//! // Create from whole pesos (the only constructor)
//! let price = Money::from_pesos(8_500);
//!
//! // Arithmetic operations
//! let line = price * 100;                       // $850.000
//! let total = line + Money::from_pesos(50_000); // $900.000
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in whole Chilean pesos.
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate subtractions may dip negative; the
///   totals engine treats a negative aggregate as an invariant violation
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// EVERY monetary value in the system flows through this type:
/// `Product.price` → `LineItem.unit_price` → line subtotal → quote totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

/// Basis points per whole (100%). 1 bps = 0.01%.
pub const BPS_SCALE: i64 = 10_000;

impl Money {
    /// Creates a Money value from whole pesos.
    ///
    /// ## Example
    /// ```rust
    /// use cotizador_core::money::Money;
    ///
    /// let price = Money::from_pesos(8_500);
    /// assert_eq!(price.pesos(), 8_500);
    /// ```
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Money(pesos)
    }

    /// Returns the value in whole pesos.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Takes a percentage portion of this amount, rounding half up.
    ///
    /// ## Arguments
    /// * `bps` - Portion in basis points (1900 = 19%, 10000 = 100%)
    ///
    /// ## Rounding
    /// Integer math with a single round-half-up at the end:
    /// `(amount * bps + 5000) / 10000`. i128 intermediates prevent
    /// overflow on large construction quotes.
    ///
    /// ## Example
    /// ```rust
    /// use cotizador_core::money::Money;
    ///
    /// let net = Money::from_pesos(1_557_500);
    /// assert_eq!(net.portion_bps(1_900).pesos(), 295_925); // 19% IVA
    /// ```
    pub fn portion_bps(&self, bps: u32) -> Money {
        let portion = (self.0 as i128 * bps as i128 + 5_000) / BPS_SCALE as i128;
        Money(portion as i64)
    }

    /// Calculates tax on this amount.
    ///
    /// ## Example
    /// ```rust
    /// use cotizador_core::money::Money;
    /// use cotizador_core::types::TaxRate;
    ///
    /// let net = Money::from_pesos(100_000);
    /// let iva = net.calculate_tax(TaxRate::from_bps(1_900));
    /// assert_eq!(iva.pesos(), 19_000);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.portion_bps(rate.bps())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use cotizador_core::money::Money;
    ///
    /// let unit_price = Money::from_pesos(15_000);
    /// assert_eq!(unit_price.multiply_quantity(50).pesos(), 750_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Formats the amount for display in Chilean peso convention:
    /// `$` prefix, dot thousands separators, zero fractional digits.
    ///
    /// Quotes are issued in whole currency units, so this is the one
    /// formatting routine every caller (summary screen, PDF payload,
    /// spreadsheet export) goes through.
    ///
    /// ## Example
    /// ```rust
    /// use cotizador_core::money::Money;
    ///
    /// assert_eq!(Money::from_pesos(1_903_425).format_clp(), "$1.903.425");
    /// assert_eq!(Money::from_pesos(-500).format_clp(), "-$500");
    /// assert_eq!(Money::zero().format_clp(), "$0");
    /// ```
    pub fn format_clp(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.abs().to_string();

        // Group digits in threes from the right, joined by dots.
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        let offset = digits.len() % 3;
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (i + 3 - offset) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        format!("{}${}", sign, grouped)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display delegates to the CLP formatting used everywhere else.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_clp())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summing an iterator of Money values (line subtotal aggregation).
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pesos() {
        let money = Money::from_pesos(8_500);
        assert_eq!(money.pesos(), 8_500);
    }

    #[test]
    fn test_format_clp() {
        assert_eq!(Money::from_pesos(0).format_clp(), "$0");
        assert_eq!(Money::from_pesos(500).format_clp(), "$500");
        assert_eq!(Money::from_pesos(8_500).format_clp(), "$8.500");
        assert_eq!(Money::from_pesos(850_000).format_clp(), "$850.000");
        assert_eq!(Money::from_pesos(1_903_425).format_clp(), "$1.903.425");
        assert_eq!(Money::from_pesos(-42_500).format_clp(), "-$42.500");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_pesos(1_000);
        let b = Money::from_pesos(500);

        assert_eq!((a + b).pesos(), 1_500);
        assert_eq!((a - b).pesos(), 500);
        assert_eq!((a * 3).pesos(), 3_000);
    }

    #[test]
    fn test_sum() {
        let total: Money = [807_500, 750_000]
            .iter()
            .map(|&p| Money::from_pesos(p))
            .sum();
        assert_eq!(total.pesos(), 1_557_500);
    }

    #[test]
    fn test_portion_bps_exact() {
        // 19% of 1.557.500 is exact
        let net = Money::from_pesos(1_557_500);
        assert_eq!(net.portion_bps(1_900).pesos(), 295_925);
    }

    #[test]
    fn test_portion_bps_rounds_half_up() {
        // 5% of 8.501 = 425,05 → 425; 5% of 8.510 = 425,5 → 426
        assert_eq!(Money::from_pesos(8_501).portion_bps(500).pesos(), 425);
        assert_eq!(Money::from_pesos(8_510).portion_bps(500).pesos(), 426);
    }

    #[test]
    fn test_tax_calculation() {
        let amount = Money::from_pesos(100_000);
        let rate = TaxRate::from_bps(1_900);
        assert_eq!(amount.calculate_tax(rate).pesos(), 19_000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_pesos(100);
        assert!(positive.is_positive());

        let negative = Money::from_pesos(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().pesos(), 100);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_pesos(8_500);
        assert_eq!(unit_price.multiply_quantity(100).pesos(), 850_000);
    }
}
