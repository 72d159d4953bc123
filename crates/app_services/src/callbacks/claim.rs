//! CLAIM approvals
//!
//! Approving a full-payout claim zeroes every ledger row of the participant
//! in the same unit of work, so the liquidated holding stops accruing.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use core_kernel::{ClaimId, ParticipantId};
use domain_approval::{Approval, ContactInfo, HasContactInfo};
use domain_claims::ClaimStatus;

use super::{is_approved, ApprovalCallback, RefRecord};
use crate::error::ServiceError;
use crate::ports::{Store, UnitOfWork};

pub struct ClaimApproval {
    store: Arc<dyn Store>,
}

impl ClaimApproval {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

/// Zeroes all ledger rows of a participant; returns how many were touched
pub async fn claim_unit_links(uow: &mut dyn UnitOfWork, participant_id: ParticipantId) -> Result<usize, ServiceError> {
    let rows = uow.unit_links_of_participant(participant_id).await?;
    let count = rows.len();
    for mut row in rows {
        row.claim();
        uow.update_unit_link(&row).await?;
    }
    Ok(count)
}

#[async_trait]
impl ApprovalCallback for ClaimApproval {
    async fn confirm(&self, approval: &Approval, uow: &mut dyn UnitOfWork) -> Result<(), ServiceError> {
        let id = ClaimId::from_uuid(approval.ref_id);
        let mut claim = uow
            .get_claim(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Claim", id))?;

        if !is_approved(approval)? {
            claim.update_status(ClaimStatus::Rejected)?;
            uow.update_claim(&claim).await?;
            return Ok(());
        }

        claim.update_status(ClaimStatus::Approved)?;
        uow.update_claim(&claim).await?;
        if claim.full_payout {
            let rows = claim_unit_links(uow, claim.participant_id).await?;
            info!(claim_id = %id, participant_id = %claim.participant_id, rows, "holding liquidated");
        }
        Ok(())
    }

    async fn find_by_id(&self, ref_id: Uuid) -> Result<Option<RefRecord>, ServiceError> {
        let mut uow = self.store.begin().await?;
        let Some(claim) = uow.get_claim(ClaimId::from_uuid(ref_id)).await? else {
            return Ok(None);
        };
        let contact = uow
            .get_participant(claim.participant_id)
            .await?
            .and_then(|p| p.contact_info())
            .map(|contact| ContactInfo {
                description: format!("Claim {}", claim.claim_number),
                ..contact
            });
        Ok(Some(RefRecord::Claim { claim, contact }))
    }

    async fn notify(&self, _approval: &Approval) -> Result<(), ServiceError> {
        Ok(())
    }
}
