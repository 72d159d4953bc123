//! Investment domain errors

use core_kernel::MoneyError;
use thiserror::Error;

/// Errors that can occur in the investment domain
#[derive(Debug, Error)]
pub enum InvestmentError {
    /// Invalid state transition attempted
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: String,
        to: String,
    },

    /// Request rejected before anything is persisted
    #[error("Validation error: {0}")]
    Validation(String),

    /// A code that is not seven digits
    #[error("Invalid investment code: {0}")]
    InvalidCode(String),

    /// Every generated code collided with an existing one
    #[error("Investment code generation exhausted after {attempts} attempts")]
    CodeExhausted {
        attempts: u32,
    },

    /// The code was free when probed but taken by the time it was inserted
    #[error("Investment code {0} was taken by a concurrent writer")]
    CodeTaken(String),

    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl InvestmentError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
