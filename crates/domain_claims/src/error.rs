//! Claims domain errors

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Invalid claim amount: {0}")]
    InvalidAmount(Decimal),

    #[error("Unknown claim value: {0}")]
    Unknown(String),
}
