//! PostgreSQL adapter for the engine's persistence ports
//!
//! [`PgStore`] hands out one database transaction per unit of work. Every
//! repository call of a [`PgUnitOfWork`] runs on that transaction, and
//! dropping the unit of work without committing rolls it back.
//!
//! ```rust,ignore
//! let pool = create_pool_from_url(&url).await?;
//! run_migrations(&pool).await?;
//! let engine = PensionEngine::new(Arc::new(PgStore::new(pool)), notifier, config)?;
//! ```

use std::time::Instant;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};
use uuid::Uuid;

use app_services::{
    ApprovalQuery, ApprovalRepository, InvestmentRepository, LedgerRepository, ReferenceRepository, Store,
    UnitOfWork,
};
use core_kernel::{
    AdapterHealth, ApprovalId, BenefitParticipationId, ClaimId, CompanyId, CustomerId, DomainPort, FeePeriod,
    HealthCheckResult, HealthCheckable, InvestmentId, ParticipantId, PaymentId, PortError, ProductId, TicketId,
};
use domain_approval::{Approval, ApprovalType};
use domain_claims::Claim;
use domain_fund::{FeeExecution, FeeKey, NetAssetValue, TransactionFee, UnitLink, UnitLinkKey};
use domain_investment::{FeeConfiguration, Investment, InvestmentCode, InvestmentItem, InvestmentPayment};
use domain_party::{BenefitParticipation, Company, Customer, Participant, Ticket};

use crate::error::DatabaseError;
use crate::repositories::{approval, investment, ledger, reference};

/// PostgreSQL-backed [`Store`]
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DomainPort for PgStore {}

#[async_trait]
impl HealthCheckable for PgStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };
        HealthCheckResult {
            adapter_id: "postgres".to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl Store for PgStore {
    #[instrument(skip(self))]
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, PortError> {
        let tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        debug!("transaction opened");
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// One open transaction
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

fn port<T>(result: Result<T, DatabaseError>) -> Result<T, PortError> {
    result.map_err(PortError::from)
}

#[async_trait]
impl InvestmentRepository for PgUnitOfWork {
    #[instrument(skip_all, fields(investment_id = %investment.id, code = %investment.code))]
    async fn insert_investment(&mut self, investment: &Investment) -> Result<(), PortError> {
        port(investment::insert_investment(&mut self.tx, investment).await)
    }

    async fn update_investment(&mut self, investment: &Investment) -> Result<(), PortError> {
        port(investment::update_investment(&mut self.tx, investment).await)
    }

    async fn get_investment(&mut self, id: InvestmentId) -> Result<Option<Investment>, PortError> {
        port(investment::get_investment(&mut self.tx, id).await)
    }

    async fn code_exists(&mut self, code: &InvestmentCode) -> Result<bool, PortError> {
        port(investment::code_exists(&mut self.tx, code).await)
    }

    #[instrument(skip_all, fields(count = items.len()))]
    async fn insert_items(&mut self, items: &[InvestmentItem]) -> Result<(), PortError> {
        port(investment::insert_items(&mut self.tx, items).await)
    }

    async fn update_item(&mut self, item: &InvestmentItem) -> Result<(), PortError> {
        port(investment::update_item(&mut self.tx, item).await)
    }

    async fn items_of(&mut self, investment_id: InvestmentId) -> Result<Vec<InvestmentItem>, PortError> {
        port(investment::items_of(&mut self.tx, investment_id).await)
    }

    async fn insert_payment(&mut self, payment: &InvestmentPayment) -> Result<(), PortError> {
        port(investment::insert_payment(&mut self.tx, payment).await)
    }

    async fn update_payment(&mut self, payment: &InvestmentPayment) -> Result<(), PortError> {
        port(investment::update_payment(&mut self.tx, payment).await)
    }

    async fn get_payment(&mut self, id: PaymentId) -> Result<Option<InvestmentPayment>, PortError> {
        port(investment::get_payment(&mut self.tx, id).await)
    }

    async fn payments_of(&mut self, investment_id: InvestmentId) -> Result<Vec<InvestmentPayment>, PortError> {
        port(investment::payments_of(&mut self.tx, investment_id).await)
    }
}

#[async_trait]
impl ApprovalRepository for PgUnitOfWork {
    #[instrument(skip_all, fields(approval_id = %approval.id, ref_id = %approval.ref_id))]
    async fn insert_approval(&mut self, approval: &Approval) -> Result<(), PortError> {
        port(approval::insert(&mut self.tx, approval).await)
    }

    async fn update_approval(&mut self, approval: &Approval) -> Result<(), PortError> {
        port(approval::update(&mut self.tx, approval).await)
    }

    async fn get_approval(&mut self, id: ApprovalId) -> Result<Option<Approval>, PortError> {
        port(approval::get(&mut self.tx, id).await)
    }

    async fn open_approval_for(
        &mut self,
        ref_id: Uuid,
        approval_type: ApprovalType,
    ) -> Result<Option<Approval>, PortError> {
        port(approval::open_for(&mut self.tx, ref_id, approval_type).await)
    }

    async fn list_approvals(&mut self, query: &ApprovalQuery) -> Result<Vec<Approval>, PortError> {
        port(approval::list(&mut self.tx, query).await)
    }
}

#[async_trait]
impl LedgerRepository for PgUnitOfWork {
    #[instrument(skip_all, fields(product_id = %key.product_id, date = %key.transaction_date, %amount))]
    async fn accumulate_unit_link(&mut self, key: &UnitLinkKey, amount: Decimal) -> Result<UnitLink, PortError> {
        port(ledger::accumulate(&mut self.tx, key, amount).await)
    }

    async fn find_unit_link(&mut self, key: &UnitLinkKey) -> Result<Option<UnitLink>, PortError> {
        port(ledger::find(&mut self.tx, key).await)
    }

    async fn update_unit_link(&mut self, row: &UnitLink) -> Result<(), PortError> {
        port(ledger::update(&mut self.tx, row).await)
    }

    async fn unit_links_on(&mut self, product_id: ProductId, date: NaiveDate) -> Result<Vec<UnitLink>, PortError> {
        port(ledger::on_date(&mut self.tx, product_id, date).await)
    }

    async fn unit_links_of_participant(&mut self, participant_id: ParticipantId) -> Result<Vec<UnitLink>, PortError> {
        port(ledger::of_participant(&mut self.tx, participant_id).await)
    }

    async fn latest_unit_links(&mut self) -> Result<Vec<UnitLink>, PortError> {
        port(ledger::latest(&mut self.tx).await)
    }

    async fn get_nav(&mut self, product_id: ProductId, date: NaiveDate) -> Result<Option<NetAssetValue>, PortError> {
        port(ledger::get_nav(&mut self.tx, product_id, date).await)
    }

    async fn navs_for(&mut self, keys: &[(ProductId, NaiveDate)]) -> Result<Vec<NetAssetValue>, PortError> {
        port(ledger::navs_for(&mut self.tx, keys).await)
    }

    async fn insert_nav(&mut self, nav: &NetAssetValue) -> Result<(), PortError> {
        port(ledger::insert_nav(&mut self.tx, nav).await)
    }

    async fn update_nav(&mut self, nav: &NetAssetValue) -> Result<(), PortError> {
        port(ledger::update_nav(&mut self.tx, nav).await)
    }

    async fn insert_transaction_fee(&mut self, fee: &TransactionFee) -> Result<(), PortError> {
        port(ledger::insert_fee(&mut self.tx, fee).await)
    }

    async fn transaction_fees(&mut self, key: &FeeKey) -> Result<Vec<TransactionFee>, PortError> {
        port(ledger::fees_of(&mut self.tx, key).await)
    }

    async fn fee_executed(&mut self, key: &FeeKey, period: FeePeriod) -> Result<bool, PortError> {
        port(ledger::fee_executed(&mut self.tx, key, period).await)
    }

    async fn record_fee_execution(&mut self, execution: &FeeExecution) -> Result<(), PortError> {
        port(ledger::record_fee_execution(&mut self.tx, execution).await)
    }
}

#[async_trait]
impl ReferenceRepository for PgUnitOfWork {
    async fn fee_configuration(&mut self) -> Result<FeeConfiguration, PortError> {
        port(reference::fee_configuration(&mut self.tx).await)
    }

    async fn insert_company(&mut self, company: &Company) -> Result<(), PortError> {
        port(reference::insert_company(&mut self.tx, company).await)
    }

    async fn get_company(&mut self, id: CompanyId) -> Result<Option<Company>, PortError> {
        port(reference::get_company(&mut self.tx, id).await)
    }

    async fn update_company(&mut self, company: &Company) -> Result<(), PortError> {
        port(reference::update_company(&mut self.tx, company).await)
    }

    async fn insert_customer(&mut self, customer: &Customer) -> Result<(), PortError> {
        port(reference::insert_customer(&mut self.tx, customer).await)
    }

    async fn get_customer(&mut self, id: CustomerId) -> Result<Option<Customer>, PortError> {
        port(reference::get_customer(&mut self.tx, id).await)
    }

    async fn update_customer(&mut self, customer: &Customer) -> Result<(), PortError> {
        port(reference::update_customer(&mut self.tx, customer).await)
    }

    async fn insert_participant(&mut self, participant: &Participant) -> Result<(), PortError> {
        port(reference::insert_participant(&mut self.tx, participant).await)
    }

    async fn get_participant(&mut self, id: ParticipantId) -> Result<Option<Participant>, PortError> {
        port(reference::get_participant(&mut self.tx, id).await)
    }

    async fn active_participants(&mut self, company_id: CompanyId) -> Result<Vec<Participant>, PortError> {
        port(reference::active_participants(&mut self.tx, company_id).await)
    }

    async fn insert_claim(&mut self, claim: &Claim) -> Result<(), PortError> {
        port(reference::insert_claim(&mut self.tx, claim).await)
    }

    async fn get_claim(&mut self, id: ClaimId) -> Result<Option<Claim>, PortError> {
        port(reference::get_claim(&mut self.tx, id).await)
    }

    async fn update_claim(&mut self, claim: &Claim) -> Result<(), PortError> {
        port(reference::update_claim(&mut self.tx, claim).await)
    }

    async fn insert_ticket(&mut self, ticket: &Ticket) -> Result<(), PortError> {
        port(reference::insert_ticket(&mut self.tx, ticket).await)
    }

    async fn get_ticket(&mut self, id: TicketId) -> Result<Option<Ticket>, PortError> {
        port(reference::get_ticket(&mut self.tx, id).await)
    }

    async fn update_ticket(&mut self, ticket: &Ticket) -> Result<(), PortError> {
        port(reference::update_ticket(&mut self.tx, ticket).await)
    }

    async fn insert_benefit_participation(&mut self, benefit: &BenefitParticipation) -> Result<(), PortError> {
        port(reference::insert_benefit(&mut self.tx, benefit).await)
    }

    async fn get_benefit_participation(
        &mut self,
        id: BenefitParticipationId,
    ) -> Result<Option<BenefitParticipation>, PortError> {
        port(reference::get_benefit(&mut self.tx, id).await)
    }

    async fn update_benefit_participation(&mut self, benefit: &BenefitParticipation) -> Result<(), PortError> {
        port(reference::update_benefit(&mut self.tx, benefit).await)
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    #[instrument(skip_all)]
    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        port(self.tx.commit().await.map_err(DatabaseError::from))?;
        debug!("transaction committed");
        Ok(())
    }
}
