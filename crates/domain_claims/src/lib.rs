//! Claims Domain
//!
//! Withdrawals from a participant's pension holdings.
//!
//! # Claim Lifecycle
//!
//! ```text
//! SUBMITTED -> APPROVED -> PAID
//!           \-> REJECTED
//! ```

pub mod claim;
pub mod error;

pub use claim::{Claim, ClaimStatus, ClaimType};
pub use error::ClaimError;
