//! Fee Calculator
//!
//! Every contribution path (individual, company bulk, benefit participation)
//! splits its base amount through [`split`], so that `gross == net + fee`
//! holds for every item.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{MoneyError, Percent};

/// Result of splitting a contribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Amount the investor pays
    pub gross: Decimal,
    /// Administration fee
    pub fee: Decimal,
    /// Amount invested
    pub net: Decimal,
}

impl FeeSplit {
    pub fn zero() -> Self {
        Self {
            gross: Decimal::ZERO,
            fee: Decimal::ZERO,
            net: Decimal::ZERO,
        }
    }
}

/// Splits `base` into net, fee and gross
///
/// `net = base * percent / 100`, `fee = net * admin_fee / 100`,
/// `gross = net + fee`. Fails only when `gross` does not fit a `Decimal`.
///
/// # Example
///
/// ```rust
/// use core_kernel::{MoneyError, Percent};
/// use domain_investment::split;
/// use rust_decimal_macros::dec;
///
/// let s = split(dec!(100000), Percent::HUNDRED, Percent::new(dec!(2)).unwrap()).unwrap();
/// assert_eq!(s.fee, dec!(2000));
/// assert_eq!(s.gross, dec!(102000));
/// ```
pub fn split(base: Decimal, percent: Percent, admin_fee: Percent) -> Result<FeeSplit, MoneyError> {
    let net = percent.of(base);
    let fee = admin_fee.of(net);
    let gross = net.checked_add(fee).ok_or(MoneyError::Overflow)?;
    Ok(FeeSplit { gross, fee, net })
}

/// Fee rates managed outside this core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfiguration {
    pub admin_fee_percent: Percent,
    pub operational_fee_percent: Percent,
}

impl FeeConfiguration {
    pub fn new(admin_fee_percent: Decimal, operational_fee_percent: Decimal) -> Result<Self, core_kernel::MoneyError> {
        Ok(Self {
            admin_fee_percent: Percent::new(admin_fee_percent)?,
            operational_fee_percent: Percent::new(operational_fee_percent)?,
        })
    }
}

impl Default for FeeConfiguration {
    fn default() -> Self {
        Self {
            admin_fee_percent: Percent::ZERO,
            operational_fee_percent: Percent::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_split_partial_percent() {
        let s = split(dec!(1000000), Percent::new(dec!(40)).unwrap(), Percent::new(dec!(1.5)).unwrap()).unwrap();
        assert_eq!(s.net, dec!(400000));
        assert_eq!(s.fee, dec!(6000));
        assert_eq!(s.gross, dec!(406000));
    }

    #[test]
    fn test_zero_admin_fee() {
        let s = split(dec!(500), Percent::HUNDRED, Percent::ZERO).unwrap();
        assert_eq!(s.gross, s.net);
        assert_eq!(s.fee, Decimal::ZERO);
    }

    #[test]
    fn test_gross_overflow_is_error() {
        let result = split(Decimal::MAX, Percent::HUNDRED, Percent::new(dec!(2)).unwrap());
        assert_eq!(result, Err(MoneyError::Overflow));
    }

    #[test]
    fn test_configuration_rejects_out_of_range() {
        assert!(FeeConfiguration::new(dec!(101), dec!(1)).is_err());
        assert!(FeeConfiguration::new(dec!(2), dec!(-1)).is_err());
        assert!(FeeConfiguration::new(dec!(2), dec!(0.25)).is_ok());
    }
}
