//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Integer Inside, Decimal at the Edge
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  JSON request                 engine / database          JSON response  │
//! │                                                                         │
//! │  "priceAtTime": 15.00  ──►  Money(1500) ──► INTEGER  ──►  "total": 34.2│
//! │        (Decimal)          try_from_decimal    cents     to_decimal     │
//! │                                                                         │
//! │  Amounts with more than 2 decimal places are REJECTED at the edge,     │
//! │  never silently rounded. All arithmetic in between is integer cents.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasser_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! let price = Money::try_from_decimal("price", Decimal::new(1500, 2)).unwrap();
//! assert_eq!(price.cents(), 1500);
//!
//! let line = price * 2;
//! assert_eq!(line.to_decimal().to_string(), "30.00");
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (piasters, cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: subtraction (subtotal − discount) never wraps
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized as cents**: the API converts to [`Decimal`] explicitly
///
/// ## Where Money is Used
/// ```text
/// CartLine.price_at_time ──► line total ──► subtotal
///                                              │
///                          discount ───────────┤
///                                              ▼
///                               taxable ──► calculate_tax ──► total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use kasser_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a wire decimal into cents.
    ///
    /// ## Rules
    /// - At most 2 significant decimal places (`15.5`, `15.50` ok; `15.505` rejected)
    /// - Must fit into i64 cents
    ///
    /// `field` names the offending input in the error message.
    pub fn try_from_decimal(field: &str, value: Decimal) -> Result<Money, ValidationError> {
        let mut scaled = value.normalize();
        if scaled.scale() > 2 {
            return Err(ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: "at most 2 decimal places are allowed".to_string(),
            });
        }
        scaled.rescale(2);

        i64::try_from(scaled.mantissa())
            .map(Money)
            .map_err(|_| ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: "amount is too large".to_string(),
            })
    }

    /// Converts cents back into a 2-decimal wire value.
    ///
    /// ## Example
    /// ```rust
    /// use kasser_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(420).to_decimal().to_string(), "4.20");
    /// ```
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns the value in cents (smallest currency unit).
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

    /// Calculates tax, rounding half away from zero to the nearest cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use kasser_core::money::Money;
    /// use kasser_core::types::TaxRate;
    ///
    /// let taxable = Money::from_cents(3000);   // 30.00
    /// let rate = TaxRate::from_bps(1400);       // 14 %
    /// assert_eq!(taxable.calculate_tax(rate).cents(), 420);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 so that large amounts times 10000 cannot overflow
        let product = self.0 as i128 * rate.bps() as i128;
        let tax_cents = if product >= 0 {
            (product + 5000) / 10000
        } else {
            (product - 5000) / 10000
        };
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use kasser_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1500);
    /// assert_eq!(unit_price.multiply_quantity(2).cents(), 3000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain `major.minor` without a currency symbol.
///
/// Stores print their own currency label next to amounts (receipts, errors).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
