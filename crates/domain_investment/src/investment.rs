//! Investment aggregate
//!
//! ```text
//! CREATED -> REQUEST (payment uploaded) -> SUCCESS (payment approved)
//! ```
//!
//! Status only moves forward.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CompanyId, CustomerId, InvestmentId, ParticipantId, ProgramType};

use crate::code::InvestmentCode;
use crate::error::InvestmentError;
use crate::item::InvestmentItem;
use crate::payment::InvestmentPayment;

/// Investment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvestmentStatus {
    Created,
    Request,
    Success,
}

impl InvestmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestmentStatus::Created => "CREATED",
            InvestmentStatus::Request => "REQUEST",
            InvestmentStatus::Success => "SUCCESS",
        }
    }
}

impl fmt::Display for InvestmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvestmentStatus {
    type Err = InvestmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(InvestmentStatus::Created),
            "REQUEST" => Ok(InvestmentStatus::Request),
            "SUCCESS" => Ok(InvestmentStatus::Success),
            other => Err(InvestmentError::validation(format!("unknown investment status {other}"))),
        }
    }
}

/// Where the contribution came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestmentSource {
    Regular,
    BenefitParticipation,
}

impl InvestmentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestmentSource::Regular => "REGULAR",
            InvestmentSource::BenefitParticipation => "BENEFIT_PARTICIPATION",
        }
    }
}

impl FromStr for InvestmentSource {
    type Err = InvestmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REGULAR" => Ok(InvestmentSource::Regular),
            "BENEFIT_PARTICIPATION" => Ok(InvestmentSource::BenefitParticipation),
            other => Err(InvestmentError::validation(format!("unknown investment source {other}"))),
        }
    }
}

/// Who funds the investment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Investor {
    /// Company bulk contribution (DKP)
    Company(CompanyId),
    /// Individual contribution by a registered participant
    Participant(ParticipantId),
    /// Individual contribution by a customer
    Customer(CustomerId),
}

impl Investor {
    /// Program implied by the investor: companies fund DKP, everybody else PPIP
    pub fn program(&self) -> ProgramType {
        match self {
            Investor::Company(_) => ProgramType::Dkp,
            Investor::Participant(_) | Investor::Customer(_) => ProgramType::Ppip,
        }
    }

    pub fn company_id(&self) -> Option<CompanyId> {
        match self {
            Investor::Company(id) => Some(*id),
            _ => None,
        }
    }

    pub fn participant_id(&self) -> Option<ParticipantId> {
        match self {
            Investor::Participant(id) => Some(*id),
            _ => None,
        }
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        match self {
            Investor::Customer(id) => Some(*id),
            _ => None,
        }
    }
}

/// A contribution request and its lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: InvestmentId,
    pub code: InvestmentCode,
    pub investment_type: ProgramType,
    pub investor: Investor,
    /// Requested amount
    pub amount: Decimal,
    pub status: InvestmentStatus,
    pub source: InvestmentSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Investment {
    pub fn new(code: InvestmentCode, investor: Investor, amount: Decimal, source: InvestmentSource) -> Self {
        let now = Utc::now();
        Self {
            id: InvestmentId::new_v7(),
            code,
            investment_type: investor.program(),
            investor,
            amount,
            status: InvestmentStatus::Created,
            source,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the status forward
    ///
    /// Returns `Ok(false)` when already at `target`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` if `target` is behind the current status.
    pub fn advance_to(&mut self, target: InvestmentStatus) -> Result<bool, InvestmentError> {
        if target < self.status {
            return Err(InvestmentError::transition(self.status, target));
        }
        if target == self.status {
            return Ok(false);
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(true)
    }

    pub fn is_company(&self) -> bool {
        self.investment_type == ProgramType::Dkp
    }
}

/// An investment with its items and payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentDetail {
    pub investment: Investment,
    pub items: Vec<InvestmentItem>,
    pub payments: Vec<InvestmentPayment>,
}

impl InvestmentDetail {
    pub fn total_gross(&self) -> Decimal {
        self.items.iter().map(|item| item.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn investment() -> Investment {
        Investment::new(
            InvestmentCode::random(),
            Investor::Company(CompanyId::new()),
            dec!(1000000),
            InvestmentSource::Regular,
        )
    }

    #[test]
    fn test_new_investment_is_created() {
        let inv = investment();
        assert_eq!(inv.status, InvestmentStatus::Created);
        assert_eq!(inv.investment_type, ProgramType::Dkp);
    }

    #[test]
    fn test_advance_is_monotonic() {
        let mut inv = investment();
        assert!(inv.advance_to(InvestmentStatus::Request).unwrap());
        assert!(!inv.advance_to(InvestmentStatus::Request).unwrap());
        assert!(inv.advance_to(InvestmentStatus::Success).unwrap());
        assert!(matches!(
            inv.advance_to(InvestmentStatus::Request),
            Err(InvestmentError::InvalidStateTransition { .. })
        ));
        assert_eq!(inv.status, InvestmentStatus::Success);
    }

    #[test]
    fn test_status_round_trip_strings() {
        for status in [InvestmentStatus::Created, InvestmentStatus::Request, InvestmentStatus::Success] {
            assert_eq!(status.as_str().parse::<InvestmentStatus>().unwrap(), status);
        }
    }
}
