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
//! │  In many retail systems:                                                │
//! │    Rs 10.00 / 3 = Rs 3.33 (×3 = Rs 9.99)  → Lost a paisa!              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paisa                                            │
//! │    1000 paisa / 3 = 333 paisa (×3 = 999 paisa)                          │
//! │    We KNOW we lost one, and handle it explicitly                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use dukaan_core::money::Money;
//!
//! // Create from the smallest unit (preferred)
//! let price = Money::from_paisa(1099); // Rs 10.99
//!
//! // Arithmetic operations
//! let doubled = price * 2;                       // Rs 21.98
//! let total = price + Money::from_paisa(500);    // Rs 15.99
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paisa for PKR).
///
/// ## Design Decisions
/// - **i64 (signed)**: Negative values exist transiently (a discount can
///   exceed the invoice total, see the sale protocol) and for refunds
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every balance the ledger mutates (stock value aside) flows through this
/// type: invoice totals, customer credit, supplier payables, expenses.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// The zero amount.
    pub const ZERO: Money = Money(0);

    /// Creates a Money value from paisa (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use dukaan_core::money::Money;
    ///
    /// let price = Money::from_paisa(1099); // Rs 10.99
    /// assert_eq!(price.paisa(), 1099);
    /// ```
    #[inline]
    pub const fn from_paisa(paisa: i64) -> Self {
        Money(paisa)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paisa (smallest currency unit).
    #[inline]
    pub const fn paisa(&self) -> i64 {
        self.0
    }

    /// Checks if the amount is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the amount is strictly negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Checks if the amount is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Clamps the amount at zero.
    ///
    /// This is the "floor at zero" business policy: decrements of customer
    /// credit and supplier payables must never leave a negative balance.
    ///
    /// ## Example
    /// ```rust
    /// use dukaan_core::money::Money;
    ///
    /// assert_eq!(Money::from_paisa(-250).floor_zero(), Money::ZERO);
    /// assert_eq!(Money::from_paisa(250).floor_zero(), Money::from_paisa(250));
    /// ```
    #[inline]
    pub const fn floor_zero(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        Money(self.0.min(other.0))
    }

    /// Returns the larger of two amounts.
    #[inline]
    pub fn max(self, other: Money) -> Money {
        Money(self.0.max(other.0))
    }
}

// =============================================================================
// Arithmetic Operators
// =============================================================================

impl Add for Money {
    type Output = Money;

    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    #[inline]
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    /// Multiplies an amount by a quantity (unit price × quantity).
    #[inline]
    fn mul(self, qty: i64) -> Money {
        Money(self.0 * qty)
    }
}

impl Neg for Money {
    type Output = Money;

    #[inline]
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    /// Formats as "Rs 10.99" (display only, never parsed back).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}Rs {}.{:02}", sign, abs / 100, abs % 100)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        assert_eq!(Money::from_rupees(10).paisa(), 1000);
        assert_eq!(Money::from_paisa(1099).paisa(), 1099);
        assert!(Money::ZERO.is_zero());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paisa(1099);
        let b = Money::from_paisa(500);
        assert_eq!((a + b).paisa(), 1599);
        assert_eq!((a - b).paisa(), 599);
        assert_eq!((b * 3).paisa(), 1500);
        assert_eq!((-b).paisa(), -500);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.paisa(), 2099);
    }

    #[test]
    fn test_floor_zero() {
        assert_eq!(Money::from_paisa(-1).floor_zero(), Money::ZERO);
        assert_eq!(Money::ZERO.floor_zero(), Money::ZERO);
        assert_eq!(Money::from_paisa(42).floor_zero().paisa(), 42);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paisa(1099).to_string(), "Rs 10.99");
        assert_eq!(Money::from_paisa(-250).to_string(), "-Rs 2.50");
        assert_eq!(Money::from_paisa(5).to_string(), "Rs 0.05");
    }
}
