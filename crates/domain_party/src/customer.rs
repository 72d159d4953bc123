//! Individual customers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::CustomerId;
use domain_approval::{ContactInfo, HasContactInfo};

use crate::error::PartyError;
use crate::status::RegistrationStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Customer {
    pub id: CustomerId,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn register(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: Option<String>,
    ) -> Result<Self, PartyError> {
        let now = Utc::now();
        let customer = Self {
            id: CustomerId::new_v7(),
            name: name.into(),
            email: email.into(),
            phone,
            status: RegistrationStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        customer.validate()?;
        Ok(customer)
    }

    pub fn decide(&mut self, status: RegistrationStatus) -> Result<(), PartyError> {
        self.status.decide(status)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl HasContactInfo for Customer {
    fn contact_info(&self) -> Option<ContactInfo> {
        Some(ContactInfo {
            email: self.email.clone(),
            name: self.name.clone(),
            description: "Customer registration".to_string(),
        })
    }
}
