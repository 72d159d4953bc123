//! Approval Domain
//!
//! A generic human-authorization gate. Any state-changing action on a
//! company, customer, claim, investment payment, ticket or benefit
//! participation is parked as an [`Approval`] in SUBMIT until a reviewer
//! approves or rejects it.

pub mod approval;
pub mod contact;
pub mod error;

pub use approval::{Approval, ApprovalAction, ApprovalStatus, ApprovalType};
pub use contact::{ContactInfo, HasContactInfo};
pub use error::ApprovalError;
