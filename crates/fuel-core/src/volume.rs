//! # Volume Module
//!
//! Provides the `Volume` type for handling fuel quantities safely.
//!
//! ## Why Integer Volumes?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A ledger that must prove `stock_after = stock_before ± amount` for     │
//! │  every row cannot tolerate representation drift.                        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centiliters                                      │
//! │    50.00 L = 5000 cl. Exact addition, exact reversal, exact audit.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fuel_core::volume::Volume;
//!
//! // Create from centiliters (preferred)
//! let amount = Volume::from_centiliters(5_000); // 50.00 L
//!
//! // Arithmetic operations
//! let total = amount + Volume::from_centiliters(2_550); // 75.50 L
//! assert_eq!(total.centiliters(), 7_550);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

// =============================================================================
// Volume Type
// =============================================================================

/// A fuel quantity in centiliters (hundredths of a liter).
///
/// ## Design Decisions
/// - **i64 (signed)**: deltas can be negative (dispenses, reversals)
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Two decimal places**: matches pump meters, which read in 0.01 L steps
///
/// Every fuel quantity in the system flows through this type: tank capacity,
/// live stock, movement amounts, meter readings and receipt line liters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Volume(i64);

impl Volume {
    /// Creates a Volume from centiliters (the smallest unit).
    ///
    /// ## Example
    /// ```rust
    /// use fuel_core::volume::Volume;
    ///
    /// let v = Volume::from_centiliters(5_000); // 50.00 L
    /// assert_eq!(v.centiliters(), 5_000);
    /// ```
    #[inline]
    pub const fn from_centiliters(cl: i64) -> Self {
        Volume(cl)
    }

    /// Creates a Volume from whole liters.
    ///
    /// ## Example
    /// ```rust
    /// use fuel_core::volume::Volume;
    ///
    /// assert_eq!(Volume::from_liters(50).centiliters(), 5_000);
    /// ```
    #[inline]
    pub const fn from_liters(liters: i64) -> Self {
        Volume(liters * 100)
    }

    /// Returns the value in centiliters.
    #[inline]
    pub const fn centiliters(&self) -> i64 {
        self.0
    }

    /// Returns the whole-liter portion (truncated toward zero).
    #[inline]
    pub const fn whole_liters(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the fractional centiliter portion (always 0-99).
    #[inline]
    pub const fn fraction(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero volume.
    #[inline]
    pub const fn zero() -> Self {
        Volume(0)
    }

    /// Checks whether the volume is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Absolute magnitude.
    #[inline]
    pub const fn abs(&self) -> Self {
        Volume(self.0.abs())
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

impl Add for Volume {
    type Output = Volume;

    #[inline]
    fn add(self, rhs: Volume) -> Volume {
        Volume(self.0 + rhs.0)
    }
}

impl AddAssign for Volume {
    #[inline]
    fn add_assign(&mut self, rhs: Volume) {
        self.0 += rhs.0;
    }
}

impl Sub for Volume {
    type Output = Volume;

    #[inline]
    fn sub(self, rhs: Volume) -> Volume {
        Volume(self.0 - rhs.0)
    }
}

impl SubAssign for Volume {
    #[inline]
    fn sub_assign(&mut self, rhs: Volume) {
        self.0 -= rhs.0;
    }
}

impl Neg for Volume {
    type Output = Volume;

    #[inline]
    fn neg(self) -> Volume {
        Volume(-self.0)
    }
}

// =============================================================================
// Display
// =============================================================================

impl fmt::Display for Volume {
    /// Formats as liters with two decimal places, e.g. `"50.00 L"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-{}.{:02} L", (-self.0) / 100, (-self.0) % 100)
        } else {
            write!(f, "{}.{:02} L", self.0 / 100, self.0 % 100)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_centiliters() {
        let v = Volume::from_centiliters(5_000);
        assert_eq!(v.centiliters(), 5_000);
        assert_eq!(v.whole_liters(), 50);
        assert_eq!(v.fraction(), 0);
    }

    #[test]
    fn test_from_liters() {
        assert_eq!(Volume::from_liters(300).centiliters(), 30_000);
    }

    #[test]
    fn test_arithmetic() {
        let a = Volume::from_centiliters(5_000);
        let b = Volume::from_centiliters(2_550);

        assert_eq!((a + b).centiliters(), 7_550);
        assert_eq!((a - b).centiliters(), 2_450);
        assert_eq!((-a).centiliters(), -5_000);

        let mut c = a;
        c += b;
        assert_eq!(c.centiliters(), 7_550);
        c -= b;
        assert_eq!(c, a);
    }

    #[test]
    fn test_display() {
        assert_eq!(Volume::from_centiliters(5_000).to_string(), "50.00 L");
        assert_eq!(Volume::from_centiliters(105).to_string(), "1.05 L");
        assert_eq!(Volume::from_centiliters(-250).to_string(), "-2.50 L");
        assert_eq!(Volume::zero().to_string(), "0.00 L");
    }

    #[test]
    fn test_meter_difference_is_exact() {
        // meterStart 1200.00 L, meterEnd 1150.00 L -> 50.00 L dispensed
        let start = Volume::from_centiliters(120_000);
        let end = Volume::from_centiliters(115_000);
        assert_eq!((start - end).centiliters(), 5_000);
    }
}
