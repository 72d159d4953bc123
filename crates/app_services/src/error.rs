//! Service-level errors
//!
//! Callers branch on the kind: validation failures are never retried,
//! not-found names the missing record, exhaustion is fatal for the call
//! and port failures mean the unit of work was rolled back.

use thiserror::Error;

use core_kernel::PortError;
use domain_approval::ApprovalError;
use domain_claims::ClaimError;
use domain_fund::FundError;
use domain_investment::InvestmentError;
use domain_party::PartyError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound {
        entity: String,
        id: String,
    },

    #[error("Exhausted: {0}")]
    Exhausted(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Wiring mistake detected at startup
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Port(PortError),

    #[error(transparent)]
    Investment(#[from] InvestmentError),

    #[error(transparent)]
    Fund(#[from] FundError),

    #[error(transparent)]
    Approval(#[from] ApprovalError),

    #[error(transparent)]
    Party(#[from] PartyError),

    #[error(transparent)]
    Claim(#[from] ClaimError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }

    /// Rejected input or an illegal state change; retrying will not help
    pub fn is_validation(&self) -> bool {
        match self {
            ServiceError::Validation(_)
            | ServiceError::Conflict(_)
            | ServiceError::Approval(_)
            | ServiceError::Party(_)
            | ServiceError::Claim(_) => true,
            ServiceError::Investment(e) => {
                !matches!(e, InvestmentError::CodeExhausted { .. } | InvestmentError::CodeTaken(_))
            }
            ServiceError::Fund(e) => !matches!(e, FundError::CalculationError(_)),
            _ => false,
        }
    }
}

impl From<PortError> for ServiceError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => ServiceError::NotFound { entity: entity_type, id },
            PortError::Validation { message, .. } => ServiceError::Validation(message),
            PortError::Conflict { message } => ServiceError::Conflict(message),
            other => ServiceError::Port(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_not_found_keeps_kind() {
        let error: ServiceError = PortError::not_found("Approval", "42").into();
        assert!(error.is_not_found());
        assert!(!error.is_validation());
    }

    #[test]
    fn test_connection_failure_is_not_validation() {
        let error: ServiceError = PortError::connection("pool closed").into();
        assert!(matches!(error, ServiceError::Port(_)));
        assert!(!error.is_validation());
    }

    #[test]
    fn test_domain_errors_classify_as_validation() {
        let error: ServiceError = InvestmentError::validation("no allocations").into();
        assert!(error.is_validation());
        let error: ServiceError = InvestmentError::CodeExhausted { attempts: 10 }.into();
        assert!(!error.is_validation());
    }
}
