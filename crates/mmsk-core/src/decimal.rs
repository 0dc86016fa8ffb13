//! Precision-safe decimal types for order amounts.
//!
//! Uses `rust_decimal` for exact decimal arithmetic. Settlement contracts
//! compare integer amounts, so every conversion here truncates toward zero
//! and never rounds up.

use crate::error::{CoreError, Result};
use crate::types::Side;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Fractional digits kept on an exchange rate.
pub const RATE_DECIMALS: u32 = 8;

/// Token amount with exact decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(pub Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Truncate toward zero at `dp` fractional digits.
    #[inline]
    pub fn truncate(&self, dp: u32) -> Self {
        Self(self.0.round_dp_with_strategy(dp, RoundingStrategy::ToZero))
    }

    /// Divide by a rate. `None` when the rate is zero or the result overflows.
    #[inline]
    pub fn checked_div(&self, rate: Rate) -> Option<Self> {
        self.0.checked_div(rate.0).map(Self)
    }

    /// Multiply by a rate. `None` on overflow.
    #[inline]
    pub fn checked_mul(&self, rate: Rate) -> Option<Self> {
        self.0.checked_mul(rate.0).map(Self)
    }

    /// Express the amount as an integer count of smallest units.
    ///
    /// The amount is truncated at `decimals` first, so `0.1234567` with six
    /// decimals becomes `123456`.
    pub fn to_base_units(&self, decimals: u32) -> Result<u128> {
        if self.0.is_sign_negative() && !self.0.is_zero() {
            return Err(CoreError::InvalidAmount(format!(
                "negative amount {} cannot be scaled",
                self.0
            )));
        }

        let truncated = self.truncate(decimals).0;
        let overflow = || CoreError::AmountOverflow {
            amount: self.0.to_string(),
            decimals,
        };

        let mantissa = u128::try_from(truncated.mantissa()).map_err(|_| overflow())?;
        let shift = decimals.checked_sub(truncated.scale()).ok_or_else(overflow)?;

        10u128
            .checked_pow(shift)
            .and_then(|factor| mantissa.checked_mul(factor))
            .ok_or_else(overflow)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Amount {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Exchange rate quoted to the taker: units of quote token per unit of base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(pub Decimal);

impl Rate {
    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    /// Derive the rate from a provider price.
    ///
    /// BUY inverts the price. The result is rounded half away from zero at
    /// `RATE_DECIMALS`. Returns `None` for a non-positive price or a rate that
    /// rounds to zero.
    pub fn for_side(price: Decimal, side: Side) -> Option<Self> {
        if price <= Decimal::ZERO {
            return None;
        }

        let raw = match side {
            Side::Buy => Decimal::ONE.checked_div(price)?,
            Side::Sell => price,
        };

        let rounded =
            raw.round_dp_with_strategy(RATE_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
        if rounded.is_zero() {
            None
        } else {
            Some(Self(rounded.normalize()))
        }
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
