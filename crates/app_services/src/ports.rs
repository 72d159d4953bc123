//! Persistence and notification ports
//!
//! Every write of the engine goes through a [`UnitOfWork`] obtained from a
//! [`Store`]. A unit of work commits all of its writes or none: dropping it
//! without calling [`UnitOfWork::commit`] rolls back.
//!
//! # Adapters
//!
//! - **Memory**: [`crate::memory::MemoryStore`], used by tests and dry runs
//! - **PostgreSQL**: `infra_db::PgStore`, one database transaction per unit of work
//!
//! ```rust,ignore
//! let mut uow = store.begin().await?;
//! let row = uow.accumulate_unit_link(&key, dec!(100000)).await?;
//! uow.commit().await?;
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{
    ApprovalId, BenefitParticipationId, ClaimId, CompanyId, CustomerId, DomainPort, FeePeriod,
    HealthCheckable, InvestmentId, ParticipantId, PaymentId, PortError, ProductId, TicketId,
};
use domain_approval::{Approval, ApprovalStatus, ApprovalType, ContactInfo};
use domain_claims::Claim;
use domain_fund::{FeeExecution, FeeKey, NetAssetValue, TransactionFee, UnitLink, UnitLinkKey};
use domain_investment::{
    FeeConfiguration, Investment, InvestmentCode, InvestmentItem, InvestmentPayment,
};
use domain_party::{BenefitParticipation, Company, Customer, Participant, Ticket};

/// Investments, their items and payments
#[async_trait]
pub trait InvestmentRepository: Send {
    /// Inserts an investment; a duplicate code is a `Conflict`
    async fn insert_investment(&mut self, investment: &Investment) -> Result<(), PortError>;
    async fn update_investment(&mut self, investment: &Investment) -> Result<(), PortError>;
    async fn get_investment(&mut self, id: InvestmentId) -> Result<Option<Investment>, PortError>;
    async fn code_exists(&mut self, code: &InvestmentCode) -> Result<bool, PortError>;

    async fn insert_items(&mut self, items: &[InvestmentItem]) -> Result<(), PortError>;
    async fn update_item(&mut self, item: &InvestmentItem) -> Result<(), PortError>;
    async fn items_of(&mut self, investment_id: InvestmentId) -> Result<Vec<InvestmentItem>, PortError>;

    async fn insert_payment(&mut self, payment: &InvestmentPayment) -> Result<(), PortError>;
    async fn update_payment(&mut self, payment: &InvestmentPayment) -> Result<(), PortError>;
    async fn get_payment(&mut self, id: PaymentId) -> Result<Option<InvestmentPayment>, PortError>;
    async fn payments_of(&mut self, investment_id: InvestmentId) -> Result<Vec<InvestmentPayment>, PortError>;
}

/// Query parameters for listing approvals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApprovalQuery {
    /// Filter by approval type
    pub approval_type: Option<ApprovalType>,
    /// Filter by status
    pub status: Option<ApprovalStatus>,
    /// Limit results
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

impl ApprovalQuery {
    /// Open approvals of one type
    pub fn pending(approval_type: ApprovalType) -> Self {
        Self {
            approval_type: Some(approval_type),
            status: Some(ApprovalStatus::Submit),
            ..Default::default()
        }
    }

    pub fn matches(&self, approval: &Approval) -> bool {
        self.approval_type.map_or(true, |t| t == approval.approval_type)
            && self.status.map_or(true, |s| s == approval.status)
    }
}

#[async_trait]
pub trait ApprovalRepository: Send {
    async fn insert_approval(&mut self, approval: &Approval) -> Result<(), PortError>;
    async fn update_approval(&mut self, approval: &Approval) -> Result<(), PortError>;
    async fn get_approval(&mut self, id: ApprovalId) -> Result<Option<Approval>, PortError>;
    /// The SUBMIT approval guarding `ref_id`, if any
    async fn open_approval_for(
        &mut self,
        ref_id: Uuid,
        approval_type: ApprovalType,
    ) -> Result<Option<Approval>, PortError>;
    /// Newest first
    async fn list_approvals(&mut self, query: &ApprovalQuery) -> Result<Vec<Approval>, PortError>;
}

/// Unit links, NAVs and the fee audit trail
#[async_trait]
pub trait LedgerRepository: Send {
    /// Adds `amount` to the row at `key`, inserting a pending row if absent
    ///
    /// Must be a single atomic operation: concurrent contributions to the
    /// same key are all counted.
    async fn accumulate_unit_link(&mut self, key: &UnitLinkKey, amount: Decimal) -> Result<UnitLink, PortError>;
    async fn find_unit_link(&mut self, key: &UnitLinkKey) -> Result<Option<UnitLink>, PortError>;
    async fn update_unit_link(&mut self, row: &UnitLink) -> Result<(), PortError>;
    async fn unit_links_on(&mut self, product_id: ProductId, date: NaiveDate) -> Result<Vec<UnitLink>, PortError>;
    async fn unit_links_of_participant(&mut self, participant_id: ParticipantId) -> Result<Vec<UnitLink>, PortError>;
    /// The most recent row of every holding, priced or not
    async fn latest_unit_links(&mut self) -> Result<Vec<UnitLink>, PortError>;

    async fn get_nav(&mut self, product_id: ProductId, date: NaiveDate) -> Result<Option<NetAssetValue>, PortError>;
    async fn navs_for(&mut self, keys: &[(ProductId, NaiveDate)]) -> Result<Vec<NetAssetValue>, PortError>;
    async fn insert_nav(&mut self, nav: &NetAssetValue) -> Result<(), PortError>;
    async fn update_nav(&mut self, nav: &NetAssetValue) -> Result<(), PortError>;

    async fn insert_transaction_fee(&mut self, fee: &TransactionFee) -> Result<(), PortError>;
    async fn transaction_fees(&mut self, key: &FeeKey) -> Result<Vec<TransactionFee>, PortError>;
    async fn fee_executed(&mut self, key: &FeeKey, period: FeePeriod) -> Result<bool, PortError>;
    /// A second marker for the same key and period is a `Conflict`
    async fn record_fee_execution(&mut self, execution: &FeeExecution) -> Result<(), PortError>;
}

/// Reference records maintained outside the engine
#[async_trait]
pub trait ReferenceRepository: Send {
    async fn fee_configuration(&mut self) -> Result<FeeConfiguration, PortError>;

    async fn insert_company(&mut self, company: &Company) -> Result<(), PortError>;
    async fn get_company(&mut self, id: CompanyId) -> Result<Option<Company>, PortError>;
    async fn update_company(&mut self, company: &Company) -> Result<(), PortError>;

    async fn insert_customer(&mut self, customer: &Customer) -> Result<(), PortError>;
    async fn get_customer(&mut self, id: CustomerId) -> Result<Option<Customer>, PortError>;
    async fn update_customer(&mut self, customer: &Customer) -> Result<(), PortError>;

    async fn insert_participant(&mut self, participant: &Participant) -> Result<(), PortError>;
    async fn get_participant(&mut self, id: ParticipantId) -> Result<Option<Participant>, PortError>;
    async fn active_participants(&mut self, company_id: CompanyId) -> Result<Vec<Participant>, PortError>;

    async fn insert_claim(&mut self, claim: &Claim) -> Result<(), PortError>;
    async fn get_claim(&mut self, id: ClaimId) -> Result<Option<Claim>, PortError>;
    async fn update_claim(&mut self, claim: &Claim) -> Result<(), PortError>;

    async fn insert_ticket(&mut self, ticket: &Ticket) -> Result<(), PortError>;
    async fn get_ticket(&mut self, id: TicketId) -> Result<Option<Ticket>, PortError>;
    async fn update_ticket(&mut self, ticket: &Ticket) -> Result<(), PortError>;

    async fn insert_benefit_participation(&mut self, benefit: &BenefitParticipation) -> Result<(), PortError>;
    async fn get_benefit_participation(
        &mut self,
        id: BenefitParticipationId,
    ) -> Result<Option<BenefitParticipation>, PortError>;
    async fn update_benefit_participation(&mut self, benefit: &BenefitParticipation) -> Result<(), PortError>;
}

/// An atomic batch of reads and writes
#[async_trait]
pub trait UnitOfWork:
    InvestmentRepository + ApprovalRepository + LedgerRepository + ReferenceRepository + Send
{
    async fn commit(self: Box<Self>) -> Result<(), PortError>;
}

/// Source of units of work
#[async_trait]
pub trait Store: DomainPort + HealthCheckable {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, PortError>;
}

/// Sent once when an approval is rejected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionNotice {
    pub approval_id: ApprovalId,
    pub approval_type: ApprovalType,
    pub reason: Option<String>,
    pub contact: ContactInfo,
}

/// Tells a holder that an investment was created for them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentNotice {
    pub investment_id: InvestmentId,
    pub code: InvestmentCode,
    pub amount: Decimal,
    pub contact: ContactInfo,
}

/// Outbound messages (email in production)
#[async_trait]
pub trait Notifier: DomainPort {
    async fn send_rejection(&self, notice: &RejectionNotice) -> Result<(), PortError>;
    async fn send_investment_created(&self, notice: &InvestmentNotice) -> Result<(), PortError>;
}
