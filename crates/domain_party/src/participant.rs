//! Program participants and their configured contributions

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{CompanyId, CustomerId, ParticipantId};
use domain_approval::{ContactInfo, HasContactInfo};

use crate::error::PartyError;

/// Monthly amounts a participant contributes under a company program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contribution {
    pub employer: Decimal,
    pub employee: Decimal,
    pub voluntary: Decimal,
    pub education_fund: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Participant {
    pub id: ParticipantId,
    /// Employer for DKP members, `None` for individual members
    pub company_id: Option<CompanyId>,
    pub customer_id: Option<CustomerId>,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub contribution: Contribution,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Participant {
    pub fn new(
        company_id: Option<CompanyId>,
        customer_id: Option<CustomerId>,
        name: impl Into<String>,
        email: impl Into<String>,
        contribution: Contribution,
    ) -> Result<Self, PartyError> {
        let participant = Self {
            id: ParticipantId::new_v7(),
            company_id,
            customer_id,
            name: name.into(),
            email: email.into(),
            contribution,
            is_active: true,
            created_at: Utc::now(),
        };
        participant.validate()?;
        if [
            contribution.employer,
            contribution.employee,
            contribution.voluntary,
            contribution.education_fund,
        ]
        .iter()
        .any(|amount| amount.is_sign_negative())
        {
            return Err(PartyError::InvalidData(format!(
                "participant {} has a negative contribution",
                participant.id
            )));
        }
        Ok(participant)
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

impl HasContactInfo for Participant {
    fn contact_info(&self) -> Option<ContactInfo> {
        Some(ContactInfo {
            email: self.email.clone(),
            name: self.name.clone(),
            description: "Pension participant".to_string(),
        })
    }
}
