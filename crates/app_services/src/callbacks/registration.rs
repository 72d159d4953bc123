//! COMPANY and CUSTOMER approvals: activating a registration

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use core_kernel::{CompanyId, CustomerId};
use domain_approval::Approval;
use domain_party::RegistrationStatus;

use super::{is_approved, ApprovalCallback, RefRecord};
use crate::error::ServiceError;
use crate::ports::{Store, UnitOfWork};

fn target_status(approval: &Approval) -> Result<RegistrationStatus, ServiceError> {
    Ok(if is_approved(approval)? {
        RegistrationStatus::Active
    } else {
        RegistrationStatus::Rejected
    })
}

pub struct CompanyApproval {
    store: Arc<dyn Store>,
}

impl CompanyApproval {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ApprovalCallback for CompanyApproval {
    async fn confirm(&self, approval: &Approval, uow: &mut dyn UnitOfWork) -> Result<(), ServiceError> {
        let id = CompanyId::from_uuid(approval.ref_id);
        let mut company = uow
            .get_company(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Company", id))?;
        let status = target_status(approval)?;
        company.decide(status)?;
        uow.update_company(&company).await?;
        info!(company_id = %id, %status, "company registration decided");
        Ok(())
    }

    async fn find_by_id(&self, ref_id: Uuid) -> Result<Option<RefRecord>, ServiceError> {
        let mut uow = self.store.begin().await?;
        Ok(uow.get_company(CompanyId::from_uuid(ref_id)).await?.map(RefRecord::Company))
    }

    async fn notify(&self, approval: &Approval) -> Result<(), ServiceError> {
        debug!(approval_id = %approval.id, "nothing to do after company decision");
        Ok(())
    }
}

pub struct CustomerApproval {
    store: Arc<dyn Store>,
}

impl CustomerApproval {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ApprovalCallback for CustomerApproval {
    async fn confirm(&self, approval: &Approval, uow: &mut dyn UnitOfWork) -> Result<(), ServiceError> {
        let id = CustomerId::from_uuid(approval.ref_id);
        let mut customer = uow
            .get_customer(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer", id))?;
        let status = target_status(approval)?;
        customer.decide(status)?;
        uow.update_customer(&customer).await?;
        info!(customer_id = %id, %status, "customer registration decided");
        Ok(())
    }

    async fn find_by_id(&self, ref_id: Uuid) -> Result<Option<RefRecord>, ServiceError> {
        let mut uow = self.store.begin().await?;
        Ok(uow.get_customer(CustomerId::from_uuid(ref_id)).await?.map(RefRecord::Customer))
    }

    async fn notify(&self, _approval: &Approval) -> Result<(), ServiceError> {
        Ok(())
    }
}
