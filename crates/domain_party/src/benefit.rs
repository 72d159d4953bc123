//! Benefit participation requests
//!
//! A participant enrolling in an additional benefit funds it with an
//! individual contribution. Once approved the request becomes a PPIP
//! investment sourced from the benefit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BenefitParticipationId, InvestmentId, ParticipantId, ProductId};

use crate::error::PartyError;
use crate::status::RegistrationStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitParticipation {
    pub id: BenefitParticipationId,
    pub participant_id: ParticipantId,
    pub benefit_type: String,
    pub product_id: ProductId,
    pub amount: Decimal,
    pub status: RegistrationStatus,
    /// Investment created when the request was approved
    pub investment_id: Option<InvestmentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BenefitParticipation {
    pub fn request(
        participant_id: ParticipantId,
        benefit_type: impl Into<String>,
        product_id: ProductId,
        amount: Decimal,
    ) -> Result<Self, PartyError> {
        let benefit_type = benefit_type.into();
        if benefit_type.trim().is_empty() {
            return Err(PartyError::InvalidData("benefit type is required".to_string()));
        }
        if amount <= Decimal::ZERO {
            return Err(PartyError::InvalidData(format!("benefit amount must be positive, got {amount}")));
        }
        let now = Utc::now();
        Ok(Self {
            id: BenefitParticipationId::new_v7(),
            participant_id,
            benefit_type,
            product_id,
            amount,
            status: RegistrationStatus::Pending,
            investment_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn approve(&mut self, investment_id: InvestmentId) -> Result<(), PartyError> {
        self.status.decide(RegistrationStatus::Active)?;
        self.investment_id = Some(investment_id);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn reject(&mut self) -> Result<(), PartyError> {
        self.status.decide(RegistrationStatus::Rejected)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}
