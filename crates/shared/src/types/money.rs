//! Decimal money amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` for exact cent arithmetic.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when an amount fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Amount must be greater than zero, got {0}")]
pub struct NonPositiveAmount(pub Decimal);

/// A monetary amount in the single reporting currency.
///
/// Serialized as a decimal string (`"300.75"`) so clients never see a
/// binary float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Decimal places kept by every stored amount.
    pub const SCALE: u32 = 2;

    /// Wraps a decimal without validation.
    #[must_use]
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Wraps a decimal, rejecting zero and negative values.
    pub fn positive(value: Decimal) -> Result<Self, NonPositiveAmount> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(NonPositiveAmount(value))
        }
    }

    /// Returns the inner decimal.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Rescales to exactly [`Self::SCALE`] places.
    ///
    /// Returns `None` when that would drop non-zero digits.
    #[must_use]
    pub fn to_cents(self) -> Option<Self> {
        let mut value = self.0;
        if value.round_dp(Self::SCALE) != value {
            return None;
        }
        value.rescale(Self::SCALE);
        Some(Self(value))
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
