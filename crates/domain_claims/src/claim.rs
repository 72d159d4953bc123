//! Pension claims
//!
//! A claim withdraws money from a participant's holdings. A full payout
//! liquidates every ledger row of the participant once approved.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, ParticipantId};

use crate::error::ClaimError;

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClaimStatus {
    /// Awaiting approval
    Submitted,
    Approved,
    Rejected,
    /// Paid out to the participant
    Paid,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Submitted => "SUBMITTED",
            ClaimStatus::Approved => "APPROVED",
            ClaimStatus::Rejected => "REJECTED",
            ClaimStatus::Paid => "PAID",
        }
    }
}

impl FromStr for ClaimStatus {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUBMITTED" => Ok(ClaimStatus::Submitted),
            "APPROVED" => Ok(ClaimStatus::Approved),
            "REJECTED" => Ok(ClaimStatus::Rejected),
            "PAID" => Ok(ClaimStatus::Paid),
            other => Err(ClaimError::Unknown(other.to_string())),
        }
    }
}

/// Reason for the withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClaimType {
    Retirement,
    Death,
    Disability,
    Resignation,
}

impl ClaimType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::Retirement => "RETIREMENT",
            ClaimType::Death => "DEATH",
            ClaimType::Disability => "DISABILITY",
            ClaimType::Resignation => "RESIGNATION",
        }
    }
}

impl FromStr for ClaimType {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RETIREMENT" => Ok(ClaimType::Retirement),
            "DEATH" => Ok(ClaimType::Death),
            "DISABILITY" => Ok(ClaimType::Disability),
            "RESIGNATION" => Ok(ClaimType::Resignation),
            other => Err(ClaimError::Unknown(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub claim_number: String,
    pub participant_id: ParticipantId,
    pub claim_type: ClaimType,
    pub amount: Decimal,
    /// Liquidates the whole holding when approved
    pub full_payout: bool,
    pub status: ClaimStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    pub fn submit(
        participant_id: ParticipantId,
        claim_type: ClaimType,
        amount: Decimal,
        full_payout: bool,
    ) -> Result<Self, ClaimError> {
        if amount.is_sign_negative() || (amount.is_zero() && !full_payout) {
            return Err(ClaimError::InvalidAmount(amount));
        }
        let now = Utc::now();
        Ok(Self {
            id: ClaimId::new_v7(),
            claim_number: generate_claim_number(),
            participant_id,
            claim_type,
            amount,
            full_payout,
            status: ClaimStatus::Submitted,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_status(&mut self, status: ClaimStatus) -> Result<(), ClaimError> {
        if !self.can_transition_to(status) {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: status.as_str().to_string(),
            });
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self.status, target),
            (Submitted, Approved) | (Submitted, Rejected) | (Approved, Paid)
        )
    }
}

fn generate_claim_number() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("CLM-{}", duration.as_millis() % 10_000_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_full_payout_may_omit_amount() {
        let claim = Claim::submit(ParticipantId::new(), ClaimType::Retirement, Decimal::ZERO, true).unwrap();
        assert!(claim.full_payout);
        assert!(claim.claim_number.starts_with("CLM-"));
    }

    #[test]
    fn test_partial_claim_needs_amount() {
        assert!(Claim::submit(ParticipantId::new(), ClaimType::Resignation, Decimal::ZERO, false).is_err());
        assert!(Claim::submit(ParticipantId::new(), ClaimType::Resignation, dec!(-5), false).is_err());
    }
}
