//! Investment Orchestrator
//!
//! Turns a contribution request into an investment with its items and, for
//! company bulk investments, the pending payment and its approval. Creation
//! is one unit of work; participants are told afterwards through the
//! background queue.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use core_kernel::{InvestmentId, ParticipantId, PortError};
use domain_approval::{Approval, ApprovalAction, ApprovalType, ContactInfo, HasContactInfo};
use domain_investment::{
    plan_company, plan_individual, Allocation, ContributionProfile, Holder, Investment,
    InvestmentCode, InvestmentDetail, InvestmentError, InvestmentPayment, InvestmentSource, InvestmentStatus,
    Investor, OriginationPlan, PaymentStatus, ProductShare,
};
use domain_party::{Participant, RegistrationStatus};

use crate::background::BackgroundQueue;
use crate::config::EngineConfig;
use crate::error::ServiceError;
use crate::ports::{InvestmentNotice, Notifier, Store, UnitOfWork};

/// A request to create an investment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInvestment {
    pub investor: Investor,
    pub amount: Decimal,
    /// Product allocations, individual investments only
    #[serde(default)]
    pub allocations: Vec<Allocation>,
    pub source: InvestmentSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedInvestment {
    pub detail: InvestmentDetail,
    /// INVESTMENT approval of the pending payment (company bulk only)
    pub approval: Option<Approval>,
    pub diff_ratio: Option<Decimal>,
}

/// A created investment and the notices to send once it is committed
pub struct Origination {
    pub created: CreatedInvestment,
    pub notices: Vec<InvestmentNotice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedPayment {
    pub investment: Investment,
    pub payment: InvestmentPayment,
    /// Approval opened by this upload; `None` when one was already open
    pub approval: Option<Approval>,
}

type CodeSource = Box<dyn Fn() -> InvestmentCode + Send + Sync>;

pub struct InvestmentOrchestrator {
    store: Arc<dyn Store>,
    queue: Arc<BackgroundQueue>,
    notifier: Arc<dyn Notifier>,
    code_attempts: u32,
    code_source: CodeSource,
}

fn profile(participant: &Participant) -> ContributionProfile {
    ContributionProfile {
        participant_id: participant.id,
        customer_id: participant.customer_id,
        employer: participant.contribution.employer,
        employee: participant.contribution.employee,
        voluntary: participant.contribution.voluntary,
        education_fund: participant.contribution.education_fund,
    }
}

impl InvestmentOrchestrator {
    pub fn new(
        store: Arc<dyn Store>,
        queue: Arc<BackgroundQueue>,
        notifier: Arc<dyn Notifier>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            store,
            queue,
            notifier,
            code_attempts: config.code_attempts,
            code_source: Box::new(InvestmentCode::random),
        }
    }

    /// Replaces the random code generator
    pub fn with_code_source<F>(mut self, source: F) -> Self
    where
        F: Fn() -> InvestmentCode + Send + Sync + 'static,
    {
        self.code_source = Box::new(source);
        self
    }

    /// Creates an investment in its own unit of work
    ///
    /// A code lost to a concurrent writer between probe and insert rolls the
    /// unit of work back and starts over, within the code attempt budget.
    #[instrument(skip(self, request), fields(investor = ?request.investor, amount = %request.amount))]
    pub async fn create_investment(&self, request: &CreateInvestment) -> Result<CreatedInvestment, ServiceError> {
        let mut attempt = 1;
        let origination = loop {
            let mut uow = self.store.begin().await?;
            match self.originate(&mut *uow, request).await {
                Ok(origination) => {
                    uow.commit().await?;
                    break origination;
                }
                Err(ServiceError::Investment(InvestmentError::CodeTaken(code))) => {
                    if attempt >= self.code_attempts {
                        return Err(ServiceError::Exhausted(format!(
                            "investment code {code} taken on the last of {} attempts",
                            self.code_attempts
                        )));
                    }
                    warn!(attempt, %code, "investment code taken concurrently, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        };

        let investment = &origination.created.detail.investment;
        info!(
            investment_id = %investment.id,
            code = %investment.code,
            items = origination.created.detail.items.len(),
            "investment created"
        );

        for notice in origination.notices {
            let notifier = self.notifier.clone();
            self.queue.submit(format!("investment-notice:{}", notice.investment_id), async move {
                notifier.send_investment_created(&notice).await?;
                Ok(())
            });
        }
        Ok(origination.created)
    }

    /// Creates an investment inside the caller's unit of work
    ///
    /// The investment row is written first, then its items, then (company
    /// bulk only) the payment and its approval.
    pub async fn originate(
        &self,
        uow: &mut dyn UnitOfWork,
        request: &CreateInvestment,
    ) -> Result<Origination, ServiceError> {
        let fees = uow.fee_configuration().await?;
        let (plan, contacts) = match request.investor {
            Investor::Company(company_id) => {
                let company = uow
                    .get_company(company_id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Company", company_id))?;
                if company.status != RegistrationStatus::Active {
                    return Err(ServiceError::validation(format!(
                        "company {} is {}, not active",
                        company.id, company.status
                    )));
                }
                let participants = uow.active_participants(company_id).await?;
                let profiles: Vec<_> = participants.iter().map(profile).collect();
                let distribution: Vec<_> = company
                    .distribution
                    .iter()
                    .map(|share| ProductShare {
                        product_id: share.product_id,
                        percent: share.percent,
                    })
                    .collect();
                let plan = plan_company(request.amount, &profiles, &distribution, &fees)?;
                let contacts = participant_contacts(&participants, &plan);
                (plan, contacts)
            }
            Investor::Participant(participant_id) => {
                let participant = uow.get_participant(participant_id).await?.ok_or_else(|| {
                    ServiceError::validation(format!("missing participant reference {participant_id}"))
                })?;
                let holder = Holder {
                    participant_id: Some(participant.id),
                    customer_id: participant.customer_id,
                };
                let plan = plan_individual(request.amount, &request.allocations, holder, &fees)?;
                (plan, participant.contact_info().into_iter().collect())
            }
            Investor::Customer(customer_id) => {
                let customer = uow
                    .get_customer(customer_id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Customer", customer_id))?;
                let holder = Holder {
                    participant_id: None,
                    customer_id: Some(customer.id),
                };
                let plan = plan_individual(request.amount, &request.allocations, holder, &fees)?;
                (plan, customer.contact_info().into_iter().collect())
            }
        };

        let code = self.generate_code(uow).await?;
        let investment = Investment::new(code, request.investor, request.amount, request.source);
        uow.insert_investment(&investment).await.map_err(|err| match err {
            PortError::Conflict { .. } => {
                ServiceError::Investment(InvestmentError::CodeTaken(investment.code.to_string()))
            }
            other => ServiceError::from(other),
        })?;

        let items = plan.items_for(investment.id);
        uow.insert_items(&items).await?;

        let mut payments = Vec::new();
        let mut approval = None;
        if investment.is_company() {
            let payment = InvestmentPayment::for_items(investment.id, &items);
            uow.insert_payment(&payment).await?;
            let opened = payment_approval(&investment, &payment);
            uow.insert_approval(&opened).await?;
            payments.push(payment);
            approval = Some(opened);
        }

        let notices = contacts
            .into_iter()
            .map(|contact| InvestmentNotice {
                investment_id: investment.id,
                code: investment.code.clone(),
                amount: investment.amount,
                contact,
            })
            .collect();

        Ok(Origination {
            created: CreatedInvestment {
                detail: InvestmentDetail {
                    investment,
                    items,
                    payments,
                },
                approval,
                diff_ratio: plan.diff_ratio,
            },
            notices,
        })
    }

    async fn generate_code(&self, uow: &mut dyn UnitOfWork) -> Result<InvestmentCode, ServiceError> {
        for attempt in 1..=self.code_attempts {
            let code = (self.code_source)();
            if !uow.code_exists(&code).await? {
                return Ok(code);
            }
            debug!(attempt, %code, "investment code collision");
        }
        Err(ServiceError::Exhausted(format!(
            "no free investment code after {} attempts",
            self.code_attempts
        )))
    }

    /// Records the transfer proof and moves the investment to REQUEST
    ///
    /// Individual investments get their payment and approval here; company
    /// bulk investments already have both and only the proof is attached.
    #[instrument(skip(self, reference))]
    pub async fn upload_payment(
        &self,
        investment_id: InvestmentId,
        reference: &str,
    ) -> Result<UploadedPayment, ServiceError> {
        let mut uow = self.store.begin().await?;
        let mut investment = uow
            .get_investment(investment_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Investment", investment_id))?;
        if investment.status == InvestmentStatus::Success {
            return Err(ServiceError::validation(format!(
                "investment {} is already settled",
                investment.code
            )));
        }

        let payments = uow.payments_of(investment_id).await?;
        let (payment, approval) = if investment.is_company() {
            let mut payment = payments
                .into_iter()
                .find(|p| p.status == PaymentStatus::Pending)
                .ok_or_else(|| {
                    ServiceError::validation(format!("investment {} has no pending payment", investment.code))
                })?;
            payment.attach_reference(reference)?;
            uow.update_payment(&payment).await?;
            (payment, None)
        } else {
            if payments.iter().any(|p| !p.status.is_terminal()) {
                return Err(ServiceError::Conflict(format!(
                    "investment {} already has a payment awaiting approval",
                    investment.code
                )));
            }
            let items = uow.items_of(investment_id).await?;
            let mut payment = InvestmentPayment::for_items(investment_id, &items);
            payment.attach_reference(reference)?;
            uow.insert_payment(&payment).await?;
            let approval = payment_approval(&investment, &payment);
            uow.insert_approval(&approval).await?;
            (payment, Some(approval))
        };

        if !investment.advance_to(InvestmentStatus::Request)? {
            warn!(code = %investment.code, "payment re-uploaded for investment already in REQUEST");
        }
        uow.update_investment(&investment).await?;
        uow.commit().await?;

        info!(code = %investment.code, payment_id = %payment.id, amount = %payment.amount, "payment uploaded");
        Ok(UploadedPayment {
            investment,
            payment,
            approval,
        })
    }

    /// Investment with its items and payments
    pub async fn get(&self, investment_id: InvestmentId) -> Result<InvestmentDetail, ServiceError> {
        let mut uow = self.store.begin().await?;
        let investment = uow
            .get_investment(investment_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Investment", investment_id))?;
        let items = uow.items_of(investment_id).await?;
        let payments = uow.payments_of(investment_id).await?;
        Ok(InvestmentDetail {
            investment,
            items,
            payments,
        })
    }
}

fn payment_approval(investment: &Investment, payment: &InvestmentPayment) -> Approval {
    Approval::submit(
        *payment.id.as_uuid(),
        ApprovalType::Investment,
        ApprovalAction::Create,
        Some(serde_json::json!({
            "investment_id": investment.id,
            "code": investment.code,
            "amount": payment.amount,
        })),
    )
}

/// Contacts of the participants that received at least one item
fn participant_contacts(participants: &[Participant], plan: &OriginationPlan) -> Vec<ContactInfo> {
    let funded: HashSet<ParticipantId> = plan
        .items
        .iter()
        .filter_map(|item| item.holder.participant_id)
        .collect();
    participants
        .iter()
        .filter(|p| funded.contains(&p.id))
        .filter_map(|p| p.contact_info())
        .collect()
}
