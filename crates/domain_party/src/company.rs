//! Employer companies running DKP programs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{CompanyId, Percent, ProductId};
use domain_approval::{ContactInfo, HasContactInfo};

use crate::error::PartyError;
use crate::status::RegistrationStatus;

/// One entry of a company's product distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionShare {
    pub product_id: ProductId,
    pub percent: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Company {
    pub id: CompanyId,
    #[validate(length(min = 1))]
    pub name: String,
    /// Person in charge
    #[validate(length(min = 1))]
    pub pic_name: String,
    #[validate(email)]
    pub email: String,
    pub status: RegistrationStatus,
    /// How bulk contributions are split across products
    pub distribution: Vec<DistributionShare>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Registers a company awaiting approval
    pub fn register(
        name: impl Into<String>,
        pic_name: impl Into<String>,
        email: impl Into<String>,
        distribution: Vec<DistributionShare>,
    ) -> Result<Self, PartyError> {
        let now = Utc::now();
        let company = Self {
            id: CompanyId::new_v7(),
            name: name.into(),
            pic_name: pic_name.into(),
            email: email.into(),
            status: RegistrationStatus::Pending,
            distribution,
            created_at: now,
            updated_at: now,
        };
        company.validate()?;
        Ok(company)
    }

    pub fn decide(&mut self, status: RegistrationStatus) -> Result<(), PartyError> {
        self.status.decide(status)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl HasContactInfo for Company {
    fn contact_info(&self) -> Option<ContactInfo> {
        Some(ContactInfo {
            email: self.email.clone(),
            name: self.pic_name.clone(),
            description: format!("Company registration for {}", self.name),
        })
    }
}
