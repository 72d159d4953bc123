//! Approval aggregate
//!
//! ```text
//! SUBMIT -> APPROVED
//!        \-> REJECTED
//! ```
//!
//! Both decisions are terminal. An approval points at the record it guards
//! through `ref_id` and `ref_table`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::ApprovalId;

use crate::error::ApprovalError;

/// The kind of record an approval guards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalType {
    Company,
    Customer,
    Claim,
    Investment,
    Ticket,
    BenefitParticipation,
}

impl ApprovalType {
    pub const ALL: [ApprovalType; 6] = [
        ApprovalType::Company,
        ApprovalType::Customer,
        ApprovalType::Claim,
        ApprovalType::Investment,
        ApprovalType::Ticket,
        ApprovalType::BenefitParticipation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalType::Company => "COMPANY",
            ApprovalType::Customer => "CUSTOMER",
            ApprovalType::Claim => "CLAIM",
            ApprovalType::Investment => "INVESTMENT",
            ApprovalType::Ticket => "TICKET",
            ApprovalType::BenefitParticipation => "BENEFIT_PARTICIPATION",
        }
    }

    /// Table holding the referenced record
    pub fn ref_table(&self) -> &'static str {
        match self {
            ApprovalType::Company => "companies",
            ApprovalType::Customer => "customers",
            ApprovalType::Claim => "claims",
            ApprovalType::Investment => "investment_payments",
            ApprovalType::Ticket => "tickets",
            ApprovalType::BenefitParticipation => "benefit_participations",
        }
    }
}

impl fmt::Display for ApprovalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalType {
    type Err = ApprovalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApprovalType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ApprovalError::UnknownType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApprovalStatus {
    Submit,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Submit => "SUBMIT",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApprovalStatus::Submit)
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = ApprovalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUBMIT" => Ok(ApprovalStatus::Submit),
            "APPROVED" => Ok(ApprovalStatus::Approved),
            "REJECTED" => Ok(ApprovalStatus::Rejected),
            other => Err(ApprovalError::UnknownStatus(other.to_string())),
        }
    }
}

/// What the approved change does to the referenced record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApprovalAction {
    Create,
    Update,
    Delete,
}

impl ApprovalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalAction::Create => "CREATE",
            ApprovalAction::Update => "UPDATE",
            ApprovalAction::Delete => "DELETE",
        }
    }
}

impl FromStr for ApprovalAction {
    type Err = ApprovalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(ApprovalAction::Create),
            "UPDATE" => Ok(ApprovalAction::Update),
            "DELETE" => Ok(ApprovalAction::Delete),
            other => Err(ApprovalError::UnknownAction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    pub id: ApprovalId,
    pub ref_id: Uuid,
    pub ref_table: String,
    pub approval_type: ApprovalType,
    pub action: ApprovalAction,
    pub status: ApprovalStatus,
    /// Reviewer's note, usually set on rejection
    pub reason: Option<String>,
    /// Free-form payload describing the requested change
    pub detail: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Approval {
    /// Opens a new approval in SUBMIT
    pub fn submit(
        ref_id: Uuid,
        approval_type: ApprovalType,
        action: ApprovalAction,
        detail: Option<serde_json::Value>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ApprovalId::new_v7(),
            ref_id,
            ref_table: approval_type.ref_table().to_string(),
            approval_type,
            action,
            status: ApprovalStatus::Submit,
            reason: None,
            detail,
            created_at: now,
            updated_at: now,
        }
    }

    /// Records the reviewer's decision
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` unless the approval is in SUBMIT and
    /// `status` is a decision.
    pub fn decide(&mut self, status: ApprovalStatus, reason: Option<String>) -> Result<(), ApprovalError> {
        if self.status.is_terminal() || !status.is_terminal() {
            return Err(ApprovalError::InvalidStateTransition {
                from: self.status.to_string(),
                to: status.to_string(),
            });
        }
        self.status = status;
        self.reason = reason;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.status == ApprovalStatus::Submit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_sets_ref_table() {
        let approval = Approval::submit(Uuid::new_v4(), ApprovalType::Investment, ApprovalAction::Create, None);
        assert_eq!(approval.ref_table, "investment_payments");
        assert!(approval.is_open());
    }

    #[test]
    fn test_decision_is_terminal() {
        let mut approval = Approval::submit(Uuid::new_v4(), ApprovalType::Claim, ApprovalAction::Create, None);
        approval.decide(ApprovalStatus::Rejected, Some("missing documents".into())).unwrap();
        assert!(approval.decide(ApprovalStatus::Approved, None).is_err());
        assert_eq!(approval.status, ApprovalStatus::Rejected);
    }

    #[test]
    fn test_cannot_decide_back_to_submit() {
        let mut approval = Approval::submit(Uuid::new_v4(), ApprovalType::Ticket, ApprovalAction::Update, None);
        assert!(approval.decide(ApprovalStatus::Submit, None).is_err());
    }
}
