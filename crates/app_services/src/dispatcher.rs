//! Approval Dispatcher
//!
//! Decides approvals and routes the decision to the callback registered for
//! the approval type. The approval row and the callback's writes share one
//! unit of work; post-commit work goes through the background queue.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use core_kernel::ApprovalId;
use domain_approval::{Approval, ApprovalAction, ApprovalStatus, ApprovalType, HasContactInfo};

use crate::background::BackgroundQueue;
use crate::callbacks::{CallbackRegistry, RefRecord};
use crate::error::ServiceError;
use crate::ports::{ApprovalQuery, Notifier, RejectionNotice, Store};

/// An approval with the record it guards
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalView {
    pub approval: Approval,
    /// `None` when the referenced record no longer exists
    pub ref_data: Option<RefRecord>,
}

pub struct ApprovalDispatcher {
    store: Arc<dyn Store>,
    registry: Arc<CallbackRegistry>,
    queue: Arc<BackgroundQueue>,
    notifier: Arc<dyn Notifier>,
}

impl ApprovalDispatcher {
    pub fn new(
        store: Arc<dyn Store>,
        registry: Arc<CallbackRegistry>,
        queue: Arc<BackgroundQueue>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            registry,
            queue,
            notifier,
        }
    }

    /// Opens a SUBMIT approval guarding `ref_id`
    #[instrument(skip(self, detail))]
    pub async fn submit(
        &self,
        ref_id: Uuid,
        approval_type: ApprovalType,
        action: ApprovalAction,
        detail: Option<serde_json::Value>,
    ) -> Result<Approval, ServiceError> {
        let mut uow = self.store.begin().await?;
        if let Some(open) = uow.open_approval_for(ref_id, approval_type).await? {
            return Err(ServiceError::Conflict(format!(
                "{approval_type} approval {} is already open for {ref_id}",
                open.id
            )));
        }
        let approval = Approval::submit(ref_id, approval_type, action, detail);
        uow.insert_approval(&approval).await?;
        uow.commit().await?;
        info!(approval_id = %approval.id, "approval submitted");
        Ok(approval)
    }

    /// Records the decision and applies it through the type's callback
    ///
    /// Both writes commit together. Afterwards the callback's notify step is
    /// queued and, for a rejection, exactly one rejection notice.
    #[instrument(skip(self, reason))]
    pub async fn confirm(
        &self,
        approval_id: ApprovalId,
        status: ApprovalStatus,
        reason: Option<String>,
    ) -> Result<Approval, ServiceError> {
        let mut uow = self.store.begin().await?;
        let mut approval = uow
            .get_approval(approval_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Approval", approval_id))?;
        let callback = self.registry.get(approval.approval_type)?;

        approval.decide(status, reason)?;
        uow.update_approval(&approval).await?;
        callback.confirm(&approval, &mut *uow).await?;
        uow.commit().await?;

        info!(
            approval_type = %approval.approval_type,
            ref_id = %approval.ref_id,
            status = %approval.status,
            "approval decided"
        );

        let decided = approval.clone();
        let notify_callback = callback.clone();
        self.queue.submit(format!("approval-notify:{approval_id}"), async move {
            notify_callback.notify(&decided).await
        });

        if approval.status == ApprovalStatus::Rejected {
            let rejected = approval.clone();
            let notifier = self.notifier.clone();
            self.queue.submit(format!("rejection-notice:{approval_id}"), async move {
                let Some(record) = callback.find_by_id(rejected.ref_id).await? else {
                    warn!(ref_id = %rejected.ref_id, "rejected record no longer exists");
                    return Ok(());
                };
                let Some(contact) = record.contact_info() else {
                    warn!(ref_id = %rejected.ref_id, "rejected record has no contact");
                    return Ok(());
                };
                let notice = RejectionNotice {
                    approval_id: rejected.id,
                    approval_type: rejected.approval_type,
                    reason: rejected.reason.clone(),
                    contact,
                };
                notifier.send_rejection(&notice).await?;
                Ok(())
            });
        }
        Ok(approval)
    }

    pub async fn find(&self, approval_id: ApprovalId) -> Result<ApprovalView, ServiceError> {
        let approval = {
            let mut uow = self.store.begin().await?;
            uow.get_approval(approval_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Approval", approval_id))?
        };
        self.hydrate(approval).await
    }

    /// Approvals matching `query`, newest first
    pub async fn list(&self, query: &ApprovalQuery) -> Result<Vec<ApprovalView>, ServiceError> {
        let approvals = {
            let mut uow = self.store.begin().await?;
            uow.list_approvals(query).await?
        };
        let mut views = Vec::with_capacity(approvals.len());
        for approval in approvals {
            views.push(self.hydrate(approval).await?);
        }
        Ok(views)
    }

    async fn hydrate(&self, approval: Approval) -> Result<ApprovalView, ServiceError> {
        let ref_data = self
            .registry
            .get(approval.approval_type)?
            .find_by_id(approval.ref_id)
            .await?;
        Ok(ApprovalView { approval, ref_data })
    }
}
