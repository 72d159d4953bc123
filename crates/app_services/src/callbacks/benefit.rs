//! BENEFIT_PARTICIPATION approvals
//!
//! An approved request is funded by a PPIP investment sourced from the
//! benefit, created inside the confirming unit of work with the same fee
//! split as any other contribution. The participant is told once the
//! decision is committed.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use core_kernel::{BenefitParticipationId, Percent};
use domain_approval::{Approval, HasContactInfo};
use domain_investment::{Allocation, InvestmentSource, Investor};

use super::{is_approved, ApprovalCallback, RefRecord};
use crate::error::ServiceError;
use crate::orchestrator::{CreateInvestment, InvestmentOrchestrator};
use crate::ports::{InvestmentNotice, Notifier, Store, UnitOfWork};

pub struct BenefitParticipationApproval {
    store: Arc<dyn Store>,
    orchestrator: Arc<InvestmentOrchestrator>,
    notifier: Arc<dyn Notifier>,
}

impl BenefitParticipationApproval {
    pub fn new(
        store: Arc<dyn Store>,
        orchestrator: Arc<InvestmentOrchestrator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            orchestrator,
            notifier,
        }
    }
}

#[async_trait]
impl ApprovalCallback for BenefitParticipationApproval {
    async fn confirm(&self, approval: &Approval, uow: &mut dyn UnitOfWork) -> Result<(), ServiceError> {
        let id = BenefitParticipationId::from_uuid(approval.ref_id);
        let mut benefit = uow
            .get_benefit_participation(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("BenefitParticipation", id))?;

        if !is_approved(approval)? {
            benefit.reject()?;
            uow.update_benefit_participation(&benefit).await?;
            return Ok(());
        }

        let request = CreateInvestment {
            investor: Investor::Participant(benefit.participant_id),
            amount: benefit.amount,
            allocations: vec![Allocation {
                product_id: benefit.product_id,
                percent: Percent::HUNDRED,
            }],
            source: InvestmentSource::BenefitParticipation,
        };
        let origination = self.orchestrator.originate(uow, &request).await?;
        let investment = &origination.created.detail.investment;
        benefit.approve(investment.id)?;
        uow.update_benefit_participation(&benefit).await?;
        info!(benefit_id = %id, investment_id = %investment.id, code = %investment.code, "benefit funded");
        Ok(())
    }

    async fn find_by_id(&self, ref_id: Uuid) -> Result<Option<RefRecord>, ServiceError> {
        let mut uow = self.store.begin().await?;
        let Some(benefit) = uow
            .get_benefit_participation(BenefitParticipationId::from_uuid(ref_id))
            .await?
        else {
            return Ok(None);
        };
        let contact = uow
            .get_participant(benefit.participant_id)
            .await?
            .and_then(|p| p.contact_info());
        Ok(Some(RefRecord::BenefitParticipation { benefit, contact }))
    }

    async fn notify(&self, approval: &Approval) -> Result<(), ServiceError> {
        if !is_approved(approval)? {
            return Ok(());
        }
        let notice = {
            let mut uow = self.store.begin().await?;
            let id = BenefitParticipationId::from_uuid(approval.ref_id);
            let benefit = uow
                .get_benefit_participation(id)
                .await?
                .ok_or_else(|| ServiceError::not_found("BenefitParticipation", id))?;
            let Some(investment_id) = benefit.investment_id else {
                return Ok(());
            };
            let investment = uow
                .get_investment(investment_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Investment", investment_id))?;
            let contact = uow
                .get_participant(benefit.participant_id)
                .await?
                .and_then(|p| p.contact_info());
            contact.map(|contact| InvestmentNotice {
                investment_id: investment.id,
                code: investment.code,
                amount: investment.amount,
                contact,
            })
        };
        if let Some(notice) = notice {
            self.notifier.send_investment_created(&notice).await?;
        }
        Ok(())
    }
}
