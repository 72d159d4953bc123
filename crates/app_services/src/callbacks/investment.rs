//! INVESTMENT approvals: a reviewer accepts or rejects an uploaded payment

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{info, instrument};
use uuid::Uuid;

use core_kernel::{PaymentId, Timezone};
use domain_approval::{Approval, ContactInfo, HasContactInfo};
use domain_fund::UnitLinkKey;
use domain_investment::{Investment, InvestmentItem, InvestmentStatus, Investor, PaymentStatus};

use super::{is_approved, ApprovalCallback, RefRecord};
use crate::error::ServiceError;
use crate::nav_publisher::NavPublisher;
use crate::ports::{Store, UnitOfWork};

pub struct InvestmentApproval {
    store: Arc<dyn Store>,
    nav: NavPublisher,
    timezone: Timezone,
}

impl InvestmentApproval {
    pub fn new(store: Arc<dyn Store>, nav: NavPublisher, timezone: Timezone) -> Self {
        Self { store, nav, timezone }
    }
}

fn ledger_key(investment: &Investment, item: &InvestmentItem, date: NaiveDate) -> UnitLinkKey {
    UnitLinkKey {
        transaction_date: date,
        customer_id: item.customer_id,
        participant_id: item.participant_id,
        product_id: item.product_id,
        unit_type: investment.investment_type,
    }
}

pub(crate) async fn investor_contact(
    uow: &mut dyn UnitOfWork,
    investor: Investor,
) -> Result<Option<ContactInfo>, ServiceError> {
    let contact = match investor {
        Investor::Company(id) => uow.get_company(id).await?.and_then(|c| c.contact_info()),
        Investor::Participant(id) => uow.get_participant(id).await?.and_then(|p| p.contact_info()),
        Investor::Customer(id) => uow.get_customer(id).await?.and_then(|c| c.contact_info()),
    };
    Ok(contact)
}

#[async_trait]
impl ApprovalCallback for InvestmentApproval {
    #[instrument(skip(self, approval, uow), fields(approval_id = %approval.id, status = %approval.status))]
    async fn confirm(&self, approval: &Approval, uow: &mut dyn UnitOfWork) -> Result<(), ServiceError> {
        let payment_id = PaymentId::from_uuid(approval.ref_id);
        let mut payment = uow
            .get_payment(payment_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("InvestmentPayment", payment_id))?;
        let mut investment = uow
            .get_investment(payment.investment_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Investment", payment.investment_id))?;

        if !is_approved(approval)? {
            payment.transition(PaymentStatus::Rejected)?;
            uow.update_payment(&payment).await?;
            info!(investment_id = %investment.id, investment_status = %investment.status, "payment rejected");
            return Ok(());
        }

        payment.transition(PaymentStatus::Success)?;
        uow.update_payment(&payment).await?;

        let date = self.timezone.date_of(approval.updated_at);
        let items = uow.items_of(investment.id).await?;
        for mut item in items {
            let key = ledger_key(&investment, &item, date);
            uow.accumulate_unit_link(&key, item.total_amount).await?;
            item.status = InvestmentStatus::Success;
            uow.update_item(&item).await?;
        }

        investment.advance_to(InvestmentStatus::Success)?;
        uow.update_investment(&investment).await?;
        info!(investment_id = %investment.id, code = %investment.code, %date, "payment approved, units credited");
        Ok(())
    }

    async fn find_by_id(&self, ref_id: Uuid) -> Result<Option<RefRecord>, ServiceError> {
        let mut uow = self.store.begin().await?;
        let Some(payment) = uow.get_payment(PaymentId::from_uuid(ref_id)).await? else {
            return Ok(None);
        };
        let Some(investment) = uow.get_investment(payment.investment_id).await? else {
            return Ok(None);
        };
        let contact = investor_contact(&mut *uow, investment.investor).await?;
        Ok(Some(RefRecord::Investment {
            investment,
            payment,
            contact,
        }))
    }

    /// Prices the rows credited by an approval when the day's NAV is already out
    async fn notify(&self, approval: &Approval) -> Result<(), ServiceError> {
        if !is_approved(approval)? {
            return Ok(());
        }
        let keys = {
            let mut uow = self.store.begin().await?;
            let payment_id = PaymentId::from_uuid(approval.ref_id);
            let payment = uow
                .get_payment(payment_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("InvestmentPayment", payment_id))?;
            let investment = uow
                .get_investment(payment.investment_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Investment", payment.investment_id))?;
            let date = self.timezone.date_of(approval.updated_at);
            let items = uow.items_of(investment.id).await?;
            let mut keys: Vec<_> = items.iter().map(|item| ledger_key(&investment, item, date)).collect();
            keys.dedup();
            keys
        };
        self.nav.forward_pass(&keys).await?;
        Ok(())
    }
}
