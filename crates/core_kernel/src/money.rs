//! Percentages and currency rounding
//!
//! Every amount in the engine is a `rust_decimal::Decimal` in whole-unit
//! rupiah precision. Fee and allocation rates enter the system as
//! percentages and are only usable once validated into a [`Percent`].

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during money and rate operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Percentage {0} is outside the range [0, 100]")]
    PercentOutOfRange(Decimal),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow")]
    Overflow,
}

/// A percentage constrained to the inclusive range [0, 100]
///
/// Fee configuration (admin and operational fee) and product allocations are
/// expressed as percentages; constructing a `Percent` is the single place the
/// range is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percent(Decimal);

impl Percent {
    /// 0%
    pub const ZERO: Percent = Percent(Decimal::ZERO);
    /// 100%
    pub const HUNDRED: Percent = Percent(Decimal::ONE_HUNDRED);

    /// Creates a percentage, rejecting values outside [0, 100]
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        if value < Decimal::ZERO || value > dec!(100) {
            return Err(MoneyError::PercentOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Returns the raw percentage value (e.g. `2` for 2%)
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns the rate as a fraction (e.g. `0.02` for 2%)
    pub fn as_fraction(&self) -> Decimal {
        self.0 / dec!(100)
    }

    /// Applies this percentage to an amount
    ///
    /// The result never exceeds `amount` in magnitude, so it cannot overflow.
    pub fn of(&self, amount: Decimal) -> Decimal {
        amount * self.as_fraction()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl TryFrom<Decimal> for Percent {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Percent::new(value)
    }
}

impl From<Percent> for Decimal {
    fn from(percent: Percent) -> Decimal {
        percent.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

/// `amount * percent / 100` for an unvalidated percent
pub fn percent_of(amount: Decimal, percent: Decimal) -> Result<Decimal, MoneyError> {
    amount
        .checked_mul(percent)
        .and_then(|scaled| scaled.checked_div(dec!(100)))
        .ok_or(MoneyError::Overflow)
}

/// Rounds an amount up to whole currency units
///
/// Payment requests are issued in whole rupiah; any fractional remainder of
/// the summed item amounts is charged as one more unit.
pub fn ceil_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::AwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_bounds() {
        assert!(Percent::new(dec!(0)).is_ok());
        assert!(Percent::new(dec!(100)).is_ok());
        assert_eq!(
            Percent::new(dec!(100.01)),
            Err(MoneyError::PercentOutOfRange(dec!(100.01)))
        );
        assert!(Percent::new(dec!(-1)).is_err());
    }

    #[test]
    fn test_percent_of() {
        let fee = Percent::new(dec!(2)).unwrap();
        assert_eq!(fee.of(dec!(100000)), dec!(2000));
        assert_eq!(fee.as_fraction(), dec!(0.02));
    }

    #[test]
    fn test_percent_of_overflow_is_error() {
        assert_eq!(percent_of(Decimal::MAX, dec!(150)), Err(MoneyError::Overflow));
        assert_eq!(Percent::HUNDRED.of(Decimal::MAX), Decimal::MAX);
    }

    #[test]
    fn test_ceil_amount() {
        assert_eq!(ceil_amount(dec!(1000.01)), dec!(1001));
        assert_eq!(ceil_amount(dec!(1000)), dec!(1000));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn percent_accepts_exactly_the_unit_range(hundredths in -10_000i64..20_000i64) {
            let value = Decimal::new(hundredths, 2);
            let accepted = Percent::new(value).is_ok();
            prop_assert_eq!(accepted, value >= Decimal::ZERO && value <= dec!(100));
        }

        #[test]
        fn ceil_never_rounds_down(minor in 0i64..1_000_000_000i64) {
            let amount = Decimal::new(minor, 2);
            let rounded = ceil_amount(amount);
            prop_assert!(rounded >= amount);
            prop_assert!(rounded - amount < Decimal::ONE);
        }
    }
}
