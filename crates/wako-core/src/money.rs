//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (sen, 1/100 rupiah)                  │
//! │    unit price "12500.50" → 1_250_050 sen                                │
//! │    line total = 1_250_050 × qty, exact                                  │
//! │                                                                         │
//! │  Invoices print whole rupiah, rounded only at display time.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use wako_core::money::Money;
//!
//! let price = Money::parse("50000").unwrap();
//! assert_eq!(price.cents(), 5_000_000);
//!
//! let total = price.checked_multiply(2).unwrap();
//! assert_eq!(total.to_string(), "Rp 100.000");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use crate::error::ValidationError;

/// Minor units per rupiah.
const CENTS_PER_UNIT: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (sen).
///
/// ## Design Decisions
/// - **i64 (signed)**: arithmetic results stay representable while summing
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serialized as the raw integer**: JSON carries minor units, never floats
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole rupiah.
    ///
    /// ## Example
    /// ```rust
    /// use wako_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupiah(5_000).cents(), 500_000);
    /// ```
    #[inline]
    pub const fn from_rupiah(rupiah: i64) -> Self {
        Money(rupiah * CENTS_PER_UNIT)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns whole rupiah, rounding half away from zero.
    ///
    /// This is the only place where precision is dropped, and only for
    /// display: `12_550` sen prints as `Rp 126`.
    pub const fn rounded_rupiah(&self) -> i64 {
        let half = CENTS_PER_UNIT / 2;
        if self.0 >= 0 {
            (self.0 + half) / CENTS_PER_UNIT
        } else {
            -((-self.0 + half) / CENTS_PER_UNIT)
        }
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// Returns `None` on overflow instead of wrapping.
    ///
    /// ## Example
    /// ```rust
    /// use wako_core::money::Money;
    ///
    /// let unit_price = Money::from_rupiah(5_000);
    /// assert_eq!(unit_price.checked_multiply(10), Some(Money::from_rupiah(50_000)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_multiply(2), None);
    /// ```
    #[inline]
    pub const fn checked_multiply(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Adds two values, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Parses a decimal amount in rupiah with at most two decimal places.
    ///
    /// ## Rules
    /// - Digits with an optional `.` and one or two fraction digits
    /// - Negative amounts are rejected; zero is allowed (free items)
    /// - No floating point is involved at any step
    ///
    /// ## Example
    /// ```rust
    /// use wako_core::money::Money;
    ///
    /// assert_eq!(Money::parse("12.5").unwrap().cents(), 1250);
    /// assert_eq!(Money::parse("12.05").unwrap().cents(), 1205);
    /// assert!(Money::parse("12.345").is_err());
    /// assert!(Money::parse("-1").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Money, ValidationError> {
        let field = "unit_price";
        let text = input.trim();

        if text.is_empty() {
            return Err(ValidationError::Required {
                field: field.to_string(),
            });
        }

        if text.starts_with('-') {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                min: 0,
                max: i64::MAX / CENTS_PER_UNIT,
            });
        }

        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (text, ""),
        };

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected a decimal number such as 12500 or 12500.50"));
        }
        if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("at most two decimal places are allowed"));
        }
        if text.ends_with('.') {
            return Err(invalid("missing digits after the decimal point"));
        }

        let too_large = || ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX / CENTS_PER_UNIT,
        };

        let whole: i64 = whole.parse().map_err(|_| too_large())?;
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| too_large())? * 10,
            _ => fraction.parse().map_err(|_| too_large())?,
        };

        whole
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|c| c.checked_add(fraction))
            .map(Money)
            .ok_or_else(too_large)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Displays whole rupiah the way invoices print them: `Rp 1.250.000`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rupiah = self.rounded_rupiah();
        let sign = if rupiah < 0 { "-" } else { "" };
        let digits = rupiah.unsigned_abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "{}Rp {}", sign, grouped)
    }
}

/// Default money is zero.
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
