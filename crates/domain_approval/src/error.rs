//! Approval domain errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApprovalError {
    /// Invalid state transition attempted
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: String,
        to: String,
    },

    #[error("Unknown approval type: {0}")]
    UnknownType(String),

    #[error("Unknown approval status: {0}")]
    UnknownStatus(String),

    #[error("Unknown approval action: {0}")]
    UnknownAction(String),
}
