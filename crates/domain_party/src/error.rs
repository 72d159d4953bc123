//! Party domain errors

use thiserror::Error;

/// Errors that can occur in the party domain
#[derive(Debug, Error)]
pub enum PartyError {
    /// Invalid party data provided
    #[error("Invalid party data: {0}")]
    InvalidData(String),

    /// Invalid state transition attempted
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: String,
        to: String,
    },

    #[error("Unknown status: {0}")]
    UnknownStatus(String),
}

impl From<validator::ValidationErrors> for PartyError {
    fn from(errors: validator::ValidationErrors) -> Self {
        PartyError::InvalidData(errors.to_string())
    }
}
