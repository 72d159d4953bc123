//! Fund Ledger Domain
//!
//! This crate holds the unit-link ledger of the pension platform: contributions
//! in currency that become fund units once the day's unit price is known.
//!
//! # Key Concepts
//!
//! - **UnitLink**: a ledger row per (date, customer, participant, product, type)
//!   accumulating net contributions; `ip = total_amount / nab` once priced
//! - **NAV (NAB)**: the published price of one unit of a product on a date
//! - **Transaction fee**: audit row of a monthly operational fee charged by
//!   diluting the holder's units
//!
//! # Unit Precision
//!
//! Units are stored with 8 decimal places:
//! - Contribution: Rp 100,000
//! - NAV: Rp 1,234.5678
//! - Units: 81.00444806

pub mod unit_link;
pub mod nav;
pub mod transaction_fee;
pub mod error;

pub use unit_link::{UnitLink, UnitLinkKey, RepriceOutcome};
pub use nav::{NetAssetValue, NavPublication, PublicationPlan, plan_publication};
pub use transaction_fee::{TransactionFee, FeeExecution, FeeKey, OperationFee};
pub use error::FundError;

use rust_decimal::Decimal;

/// Standard unit precision (8 decimal places)
pub const UNIT_PRECISION: u32 = 8;

/// Rounds a value to standard unit precision
pub fn round_units(value: Decimal) -> Decimal {
    value.round_dp(UNIT_PRECISION)
}

/// Calculates units from an amount and NAV
///
/// A zero NAV means the price is not known yet and yields zero units.
///
/// # Example
///
/// ```rust
/// use domain_fund::calculate_units;
/// use rust_decimal_macros::dec;
///
/// let units = calculate_units(dec!(100000), dec!(500));
/// assert_eq!(units, dec!(200));
/// ```
pub fn calculate_units(amount: Decimal, nav: Decimal) -> Decimal {
    if nav.is_zero() {
        return Decimal::ZERO;
    }
    round_units(amount / nav)
}

/// Calculates the currency value of units at a given NAV
pub fn calculate_value(units: Decimal, nav: Decimal) -> Decimal {
    (units * nav).round_dp(2)
}
