//! Fixed-point price/quantity discipline.
//!
//! Per spec: all prices and quantities use fixed-point arithmetic with 8
//! fractional digits; equality and ordering compare the canonical
//! fixed-point representation. This keeps the book index free of the float
//! drift a raw `f64` key would introduce.

use rust_decimal::Decimal;
use rust_decimal::prelude::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of fractional digits every [`Amount`] is normalized to.
pub const SCALE: u32 = 8;

/// A non-negative, 8-decimal fixed-point amount used for prices and
/// quantities throughout the book.
///
/// Wraps [`rust_decimal::Decimal`] rescaled to [`SCALE`] on every
/// construction, so two `Amount`s with the same mathematical value always
/// compare and hash equal, regardless of how they were parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Build an `Amount` from a `Decimal`, rescaling to [`SCALE`].
    pub fn new(mut value: Decimal) -> Self {
        value.rescale(SCALE);
        Amount(value)
    }

    /// Parse an amount from a decimal string (e.g. `"30000.00000000"`).
    pub fn parse(s: &str) -> Result<Self, rust_decimal::Error> {
        s.parse::<Decimal>().map(Amount::new)
    }

    /// Construct directly from an integer number of whole units.
    pub fn from_int(v: i64) -> Self {
        Amount::new(Decimal::from(v))
    }

    /// Whether this amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Whether this amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount::new)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount::new)
    }

    pub fn saturating_sub(self, other: Amount) -> Amount {
        self.checked_sub(other).unwrap_or(Amount::ZERO)
    }

    pub fn min(self, other: Amount) -> Amount {
        self.0.min(other.0).into()
    }

    pub fn inner(&self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = std::convert::Infallible;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Ok(Amount::new(value))
    }
}

impl From<Amount> for Decimal {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescales_to_eight_digits() {
        let a = Amount::parse("1.5").unwrap();
        assert_eq!(a.to_string(), "1.50000000");
    }

    #[test]
    fn equality_ignores_trailing_representation() {
        let a = Amount::parse("30000").unwrap();
        let b = Amount::parse("30000.00000000").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn ordering_matches_numeric_value() {
        let low = Amount::parse("99").unwrap();
        let high = Amount::parse("101").unwrap();
        assert!(low < high);
    }

    #[test]
    fn arithmetic_respects_scale() {
        let a = Amount::parse("2.0").unwrap();
        let b = Amount::parse("0.5").unwrap();
        assert_eq!(a.checked_sub(b).unwrap(), Amount::parse("1.5").unwrap());
        assert_eq!(a.saturating_sub(Amount::parse("5").unwrap()), Amount::ZERO);
    }

    #[test]
    fn min_picks_smaller_value() {
        let a = Amount::parse("3").unwrap();
        let b = Amount::parse("1").unwrap();
        assert_eq!(a.min(b), b);
    }
}
