//! Fund domain errors

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the fund domain
#[derive(Debug, Error)]
pub enum FundError {
    #[error("Unit link not found: {0}")]
    UnitLinkNotFound(String),

    #[error("NAV not found: {0}")]
    NavNotFound(String),

    #[error("Invalid NAV amount {0}: a published price must be positive")]
    InvalidNav(Decimal),

    #[error("Insufficient units: {0}")]
    InsufficientUnits(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}
