//! Core Kernel - Foundational types for the pension unit-link engine
//!
//! This crate provides the building blocks shared by every domain module:
//! - Strongly typed identifiers for investments, approvals, ledger rows and parties
//! - Percentages validated to the [0, 100] range and currency rounding
//! - The business timezone and monthly fee periods
//! - Port error types and marker traits for storage adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod program;
pub mod ports;
pub mod error;

pub use money::{Percent, MoneyError, ceil_amount, percent_of};
pub use temporal::{Timezone, FeePeriod, TemporalError};
pub use identifiers::{
    InvestmentId, InvestmentItemId, PaymentId, ApprovalId, UnitLinkId, NavId,
    TransactionFeeId, ProductId, CompanyId, CustomerId, ParticipantId, ClaimId,
    TicketId, BenefitParticipationId,
};
pub use program::ProgramType;
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
pub use error::CoreError;
