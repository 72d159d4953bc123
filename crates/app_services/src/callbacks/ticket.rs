//! TICKET approvals

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use core_kernel::TicketId;
use domain_approval::Approval;
use domain_party::TicketStatus;

use super::{is_approved, ApprovalCallback, RefRecord};
use crate::error::ServiceError;
use crate::ports::{Store, UnitOfWork};

pub struct TicketApproval {
    store: Arc<dyn Store>,
}

impl TicketApproval {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ApprovalCallback for TicketApproval {
    async fn confirm(&self, approval: &Approval, uow: &mut dyn UnitOfWork) -> Result<(), ServiceError> {
        let id = TicketId::from_uuid(approval.ref_id);
        let mut ticket = uow
            .get_ticket(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Ticket", id))?;
        let status = if is_approved(approval)? {
            TicketStatus::Resolved
        } else {
            TicketStatus::Rejected
        };
        ticket.close(status)?;
        uow.update_ticket(&ticket).await?;
        Ok(())
    }

    async fn find_by_id(&self, ref_id: Uuid) -> Result<Option<RefRecord>, ServiceError> {
        let mut uow = self.store.begin().await?;
        Ok(uow.get_ticket(TicketId::from_uuid(ref_id)).await?.map(RefRecord::Ticket))
    }

    async fn notify(&self, _approval: &Approval) -> Result<(), ServiceError> {
        Ok(())
    }
}
