//! Basis-point fee factor.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One whole in basis points.
pub const BPS_DENOMINATOR: u16 = 10_000;

/// Fee factor in basis points, always within `0..10000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeFactor(u16);

impl FeeFactor {
    /// Applied when no source provides a usable value.
    pub const FALLBACK: Self = Self(10);

    /// Accept a raw value only if it lies in `0..10000`.
    pub fn from_raw(raw: i64) -> Option<Self> {
        if (0..i64::from(BPS_DENOMINATOR)).contains(&raw) {
            Some(Self(raw as u16))
        } else {
            None
        }
    }

    /// First usable candidate in order, else `FALLBACK`.
    ///
    /// Callers pass the query override, the per-token config and the market
    /// maker default in that order. Zero is a usable value.
    pub fn resolve<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = Option<i64>>,
    {
        candidates
            .into_iter()
            .flatten()
            .find_map(Self::from_raw)
            .unwrap_or(Self::FALLBACK)
    }

    #[inline]
    pub fn bps(&self) -> u16 {
        self.0
    }

    /// `1 - bps / 10000`, the share of the gross amount the taker keeps.
    #[inline]
    pub fn net_ratio(&self) -> Decimal {
        Decimal::ONE - Decimal::from(self.0) / Decimal::from(BPS_DENOMINATOR)
    }
}

impl fmt::Display for FeeFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_raw_bounds() {
        assert_eq!(FeeFactor::from_raw(0).map(|f| f.bps()), Some(0));
        assert_eq!(FeeFactor::from_raw(9_999).map(|f| f.bps()), Some(9_999));
        assert!(FeeFactor::from_raw(10_000).is_none());
        assert!(FeeFactor::from_raw(-1).is_none());
    }

    #[test]
    fn test_resolve_precedence() {
        assert_eq!(FeeFactor::resolve([Some(5), Some(20), Some(30)]).bps(), 5);
        assert_eq!(FeeFactor::resolve([None, Some(20), Some(30)]).bps(), 20);
        assert_eq!(FeeFactor::resolve([None, None, Some(30)]).bps(), 30);
        assert_eq!(FeeFactor::resolve([None, None, None]), FeeFactor::FALLBACK);
    }

    #[test]
    fn test_resolve_zero_is_usable() {
        assert_eq!(FeeFactor::resolve([Some(0), Some(20), Some(30)]).bps(), 0);
        assert_eq!(FeeFactor::resolve([None, None, Some(0)]).bps(), 0);
    }

    #[test]
    fn test_resolve_skips_out_of_range() {
        assert_eq!(FeeFactor::resolve([Some(-5), Some(10_000), Some(30)]).bps(), 30);
    }

    #[test]
    fn test_net_ratio() {
        assert_eq!(FeeFactor::FALLBACK.net_ratio(), dec!(0.999));
    }
}
