//! Approval callbacks
//!
//! Every approval type has exactly one handler. The handler applies the
//! decision to the referenced record inside the dispatcher's unit of work,
//! loads that record for views and rejection notices, and runs best-effort
//! work after commit.

mod benefit;
mod claim;
mod investment;
mod registration;
mod ticket;

pub use benefit::BenefitParticipationApproval;
pub use claim::ClaimApproval;
pub use investment::InvestmentApproval;
pub use registration::{CompanyApproval, CustomerApproval};
pub use ticket::TicketApproval;

pub(crate) use investment::investor_contact;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use domain_approval::{Approval, ApprovalStatus, ApprovalType, ContactInfo, HasContactInfo};
use domain_claims::Claim;
use domain_investment::{Investment, InvestmentPayment};
use domain_party::{BenefitParticipation, Company, Customer, Ticket};

use crate::error::ServiceError;
use crate::ports::UnitOfWork;

/// The record an approval points at, loaded for display and notices
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RefRecord {
    Company(Company),
    Customer(Customer),
    Claim {
        claim: Claim,
        contact: Option<ContactInfo>,
    },
    Investment {
        investment: Investment,
        payment: InvestmentPayment,
        contact: Option<ContactInfo>,
    },
    Ticket(Ticket),
    BenefitParticipation {
        benefit: BenefitParticipation,
        contact: Option<ContactInfo>,
    },
}

impl HasContactInfo for RefRecord {
    fn contact_info(&self) -> Option<ContactInfo> {
        match self {
            RefRecord::Company(company) => company.contact_info(),
            RefRecord::Customer(customer) => customer.contact_info(),
            RefRecord::Ticket(ticket) => ticket.contact_info(),
            RefRecord::Claim { contact, .. }
            | RefRecord::Investment { contact, .. }
            | RefRecord::BenefitParticipation { contact, .. } => contact.clone(),
        }
    }
}

#[async_trait]
pub trait ApprovalCallback: Send + Sync {
    /// Applies the decision recorded on `approval` to the referenced record
    async fn confirm(&self, approval: &Approval, uow: &mut dyn UnitOfWork) -> Result<(), ServiceError>;

    /// Loads the referenced record; `None` when it no longer exists
    async fn find_by_id(&self, ref_id: Uuid) -> Result<Option<RefRecord>, ServiceError>;

    /// Runs after the decision was committed
    async fn notify(&self, approval: &Approval) -> Result<(), ServiceError>;
}

/// True for APPROVED, false for REJECTED
pub(crate) fn is_approved(approval: &Approval) -> Result<bool, ServiceError> {
    match approval.status {
        ApprovalStatus::Approved => Ok(true),
        ApprovalStatus::Rejected => Ok(false),
        ApprovalStatus::Submit => Err(ServiceError::validation(format!(
            "approval {} has not been decided",
            approval.id
        ))),
    }
}

/// Immutable approval type to handler table
pub struct CallbackRegistry {
    handlers: HashMap<ApprovalType, Arc<dyn ApprovalCallback>>,
}

impl CallbackRegistry {
    pub fn builder() -> CallbackRegistryBuilder {
        CallbackRegistryBuilder::default()
    }

    pub fn get(&self, approval_type: ApprovalType) -> Result<Arc<dyn ApprovalCallback>, ServiceError> {
        self.handlers
            .get(&approval_type)
            .cloned()
            .ok_or_else(|| ServiceError::configuration(format!("no callback registered for {approval_type}")))
    }
}

#[derive(Default)]
pub struct CallbackRegistryBuilder {
    handlers: HashMap<ApprovalType, Arc<dyn ApprovalCallback>>,
    duplicates: Vec<ApprovalType>,
}

impl CallbackRegistryBuilder {
    pub fn register(mut self, approval_type: ApprovalType, handler: Arc<dyn ApprovalCallback>) -> Self {
        if self.handlers.insert(approval_type, handler).is_some() {
            self.duplicates.push(approval_type);
        }
        self
    }

    /// Fails unless every approval type has exactly one handler
    pub fn build(self) -> Result<CallbackRegistry, ServiceError> {
        if let Some(duplicate) = self.duplicates.first() {
            return Err(ServiceError::configuration(format!(
                "callback for {duplicate} registered twice"
            )));
        }
        let missing: Vec<_> = ApprovalType::ALL
            .into_iter()
            .filter(|t| !self.handlers.contains_key(t))
            .map(|t| t.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(ServiceError::configuration(format!(
                "no callback registered for {}",
                missing.join(", ")
            )));
        }
        Ok(CallbackRegistry {
            handlers: self.handlers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl ApprovalCallback for Noop {
        async fn confirm(&self, _: &Approval, _: &mut dyn UnitOfWork) -> Result<(), ServiceError> {
            Ok(())
        }

        async fn find_by_id(&self, _: Uuid) -> Result<Option<RefRecord>, ServiceError> {
            Ok(None)
        }

        async fn notify(&self, _: &Approval) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    #[test]
    fn test_missing_type_fails_build() {
        let result = CallbackRegistry::builder()
            .register(ApprovalType::Company, Arc::new(Noop))
            .build();
        match result {
            Err(ServiceError::Configuration(message)) => assert!(message.contains("INVESTMENT")),
            _ => panic!("expected configuration error"),
        }
    }

    #[test]
    fn test_duplicate_registration_fails_build() {
        let mut builder = CallbackRegistry::builder();
        for approval_type in ApprovalType::ALL {
            builder = builder.register(approval_type, Arc::new(Noop));
        }
        let result = builder.register(ApprovalType::Ticket, Arc::new(Noop)).build();
        assert!(matches!(result, Err(ServiceError::Configuration(_))));
    }

    #[test]
    fn test_complete_registry_resolves_every_type() {
        let mut builder = CallbackRegistry::builder();
        for approval_type in ApprovalType::ALL {
            builder = builder.register(approval_type, Arc::new(Noop));
        }
        let registry = builder.build().unwrap();
        for approval_type in ApprovalType::ALL {
            assert!(registry.get(approval_type).is_ok());
        }
    }
}
