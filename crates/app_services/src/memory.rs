//! In-memory store
//!
//! Units of work are serialised: `begin` takes the state lock and works on a
//! copy, `commit` swaps the copy in, dropping the unit of work discards it.
//! Failures can be injected at named points to exercise rollback.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use core_kernel::{
    AdapterHealth, ApprovalId, BenefitParticipationId, ClaimId, CompanyId, CustomerId, DomainPort,
    FeePeriod, HealthCheckResult, HealthCheckable, InvestmentId, ParticipantId, PaymentId,
    PortError, ProductId, TicketId,
};
use domain_approval::{Approval, ApprovalType};
use domain_claims::Claim;
use domain_fund::{FeeExecution, FeeKey, NetAssetValue, TransactionFee, UnitLink, UnitLinkKey};
use domain_investment::{
    FeeConfiguration, Investment, InvestmentCode, InvestmentItem, InvestmentPayment,
};
use domain_party::{BenefitParticipation, Company, Customer, Participant, Ticket};

use crate::ports::{
    ApprovalQuery, ApprovalRepository, InvestmentRepository, LedgerRepository,
    ReferenceRepository, Store, UnitOfWork,
};

/// Points at which a unit of work can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    InsertInvestment,
    InsertItems,
    InsertPayment,
    InsertApproval,
    UpdateApproval,
    AccumulateUnitLink,
    UpdateUnitLink,
    InsertTransactionFee,
    Commit,
    /// Another writer takes the investment code between probe and insert
    InvestmentCodeTaken,
}

/// Everything the store holds
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub investments: HashMap<InvestmentId, Investment>,
    pub items: Vec<InvestmentItem>,
    pub payments: HashMap<PaymentId, InvestmentPayment>,
    pub approvals: HashMap<ApprovalId, Approval>,
    pub unit_links: HashMap<UnitLinkKey, UnitLink>,
    pub navs: HashMap<(ProductId, NaiveDate), NetAssetValue>,
    pub transaction_fees: Vec<TransactionFee>,
    pub fee_executions: HashSet<(FeeKey, FeePeriod)>,
    pub fee_configuration: FeeConfiguration,
    pub companies: HashMap<CompanyId, Company>,
    pub customers: HashMap<CustomerId, Customer>,
    pub participants: HashMap<ParticipantId, Participant>,
    pub claims: HashMap<ClaimId, Claim>,
    pub tickets: HashMap<TicketId, Ticket>,
    pub benefits: HashMap<BenefitParticipationId, BenefitParticipation>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<AsyncMutex<MemoryState>>,
    fail_points: Arc<Mutex<HashSet<FailPoint>>>,
    fail_once: Arc<Mutex<HashSet<FailPoint>>>,
}

fn locked(points: &Mutex<HashSet<FailPoint>>) -> std::sync::MutexGuard<'_, HashSet<FailPoint>> {
    match points.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fee_configuration(fees: FeeConfiguration) -> Self {
        let state = MemoryState {
            fee_configuration: fees,
            ..MemoryState::default()
        };
        Self {
            state: Arc::new(AsyncMutex::new(state)),
            fail_points: Arc::default(),
            fail_once: Arc::default(),
        }
    }

    /// Applies `f` to the committed state
    pub async fn seed<F>(&self, f: F)
    where
        F: FnOnce(&mut MemoryState),
    {
        let mut state = self.state.lock().await;
        f(&mut state);
    }

    /// Copy of the committed state
    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }

    /// Makes every later unit of work fail at `point`
    pub fn fail_on(&self, point: FailPoint) {
        self.points().insert(point);
    }

    /// Makes the next unit of work that reaches `point` fail there
    pub fn fail_once(&self, point: FailPoint) {
        locked(&self.fail_once).insert(point);
    }

    pub fn clear_failures(&self) {
        self.points().clear();
        locked(&self.fail_once).clear();
    }

    fn points(&self) -> std::sync::MutexGuard<'_, HashSet<FailPoint>> {
        locked(&self.fail_points)
    }
}

impl DomainPort for MemoryStore {}

#[async_trait]
impl HealthCheckable for MemoryStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: "memory".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: Some("In-memory store".to_string()),
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, PortError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        let fail_points = self.points().clone();
        Ok(Box::new(MemoryUnitOfWork {
            guard,
            working,
            fail_points,
            fail_once: self.fail_once.clone(),
        }))
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    fail_points: HashSet<FailPoint>,
    fail_once: Arc<Mutex<HashSet<FailPoint>>>,
}

impl MemoryUnitOfWork {
    fn take_once(&self, point: FailPoint) -> bool {
        locked(&self.fail_once).remove(&point)
    }

    fn check(&self, point: FailPoint) -> Result<(), PortError> {
        if self.fail_points.contains(&point) || self.take_once(point) {
            return Err(PortError::internal(format!("injected failure at {point:?}")));
        }
        Ok(())
    }
}

fn replace<K, V>(map: &mut HashMap<K, V>, key: K, value: &V, entity: &str) -> Result<(), PortError>
where
    K: std::hash::Hash + Eq + std::fmt::Display,
    V: Clone,
{
    match map.get_mut(&key) {
        Some(slot) => {
            *slot = value.clone();
            Ok(())
        }
        None => Err(PortError::not_found(entity, key)),
    }
}

fn insert_new<K, V>(map: &mut HashMap<K, V>, key: K, value: &V, entity: &str) -> Result<(), PortError>
where
    K: std::hash::Hash + Eq + std::fmt::Display,
    V: Clone,
{
    if map.contains_key(&key) {
        return Err(PortError::conflict(format!("{entity} {key} already exists")));
    }
    map.insert(key, value.clone());
    Ok(())
}

#[async_trait]
impl InvestmentRepository for MemoryUnitOfWork {
    async fn insert_investment(&mut self, investment: &Investment) -> Result<(), PortError> {
        self.check(FailPoint::InsertInvestment)?;
        if self.take_once(FailPoint::InvestmentCodeTaken)
            || self.working.investments.values().any(|i| i.code == investment.code)
        {
            return Err(PortError::conflict(format!("investment code {} already used", investment.code)));
        }
        insert_new(&mut self.working.investments, investment.id, investment, "Investment")
    }

    async fn update_investment(&mut self, investment: &Investment) -> Result<(), PortError> {
        replace(&mut self.working.investments, investment.id, investment, "Investment")
    }

    async fn get_investment(&mut self, id: InvestmentId) -> Result<Option<Investment>, PortError> {
        Ok(self.working.investments.get(&id).cloned())
    }

    async fn code_exists(&mut self, code: &InvestmentCode) -> Result<bool, PortError> {
        Ok(self.working.investments.values().any(|i| &i.code == code))
    }

    async fn insert_items(&mut self, items: &[InvestmentItem]) -> Result<(), PortError> {
        self.check(FailPoint::InsertItems)?;
        self.working.items.extend_from_slice(items);
        Ok(())
    }

    async fn update_item(&mut self, item: &InvestmentItem) -> Result<(), PortError> {
        let slot = self
            .working
            .items
            .iter_mut()
            .find(|i| i.id == item.id)
            .ok_or_else(|| PortError::not_found("InvestmentItem", item.id))?;
        *slot = item.clone();
        Ok(())
    }

    async fn items_of(&mut self, investment_id: InvestmentId) -> Result<Vec<InvestmentItem>, PortError> {
        Ok(self
            .working
            .items
            .iter()
            .filter(|i| i.investment_id == investment_id)
            .cloned()
            .collect())
    }

    async fn insert_payment(&mut self, payment: &InvestmentPayment) -> Result<(), PortError> {
        self.check(FailPoint::InsertPayment)?;
        insert_new(&mut self.working.payments, payment.id, payment, "InvestmentPayment")
    }

    async fn update_payment(&mut self, payment: &InvestmentPayment) -> Result<(), PortError> {
        replace(&mut self.working.payments, payment.id, payment, "InvestmentPayment")
    }

    async fn get_payment(&mut self, id: PaymentId) -> Result<Option<InvestmentPayment>, PortError> {
        Ok(self.working.payments.get(&id).cloned())
    }

    async fn payments_of(&mut self, investment_id: InvestmentId) -> Result<Vec<InvestmentPayment>, PortError> {
        let mut payments: Vec<_> = self
            .working
            .payments
            .values()
            .filter(|p| p.investment_id == investment_id)
            .cloned()
            .collect();
        payments.sort_by_key(|p| p.created_at);
        Ok(payments)
    }
}

#[async_trait]
impl ApprovalRepository for MemoryUnitOfWork {
    async fn insert_approval(&mut self, approval: &Approval) -> Result<(), PortError> {
        self.check(FailPoint::InsertApproval)?;
        insert_new(&mut self.working.approvals, approval.id, approval, "Approval")
    }

    async fn update_approval(&mut self, approval: &Approval) -> Result<(), PortError> {
        self.check(FailPoint::UpdateApproval)?;
        replace(&mut self.working.approvals, approval.id, approval, "Approval")
    }

    async fn get_approval(&mut self, id: ApprovalId) -> Result<Option<Approval>, PortError> {
        Ok(self.working.approvals.get(&id).cloned())
    }

    async fn open_approval_for(
        &mut self,
        ref_id: Uuid,
        approval_type: ApprovalType,
    ) -> Result<Option<Approval>, PortError> {
        Ok(self
            .working
            .approvals
            .values()
            .find(|a| a.ref_id == ref_id && a.approval_type == approval_type && a.is_open())
            .cloned())
    }

    async fn list_approvals(&mut self, query: &ApprovalQuery) -> Result<Vec<Approval>, PortError> {
        let mut approvals: Vec<_> = self
            .working
            .approvals
            .values()
            .filter(|a| query.matches(a))
            .cloned()
            .collect();
        approvals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        Ok(approvals.into_iter().skip(offset).take(limit).collect())
    }
}

#[async_trait]
impl LedgerRepository for MemoryUnitOfWork {
    async fn accumulate_unit_link(&mut self, key: &UnitLinkKey, amount: Decimal) -> Result<UnitLink, PortError> {
        self.check(FailPoint::AccumulateUnitLink)?;
        let row = self
            .working
            .unit_links
            .entry(*key)
            .and_modify(|row| row.accumulate(amount))
            .or_insert_with(|| UnitLink::pending(key, amount));
        Ok(row.clone())
    }

    async fn find_unit_link(&mut self, key: &UnitLinkKey) -> Result<Option<UnitLink>, PortError> {
        Ok(self.working.unit_links.get(key).cloned())
    }

    async fn update_unit_link(&mut self, row: &UnitLink) -> Result<(), PortError> {
        self.check(FailPoint::UpdateUnitLink)?;
        match self.working.unit_links.get_mut(&row.key()) {
            Some(slot) => {
                *slot = row.clone();
                Ok(())
            }
            None => Err(PortError::not_found("UnitLink", row.id)),
        }
    }

    async fn unit_links_on(&mut self, product_id: ProductId, date: NaiveDate) -> Result<Vec<UnitLink>, PortError> {
        Ok(self
            .working
            .unit_links
            .values()
            .filter(|row| row.product_id == product_id && row.transaction_date == date)
            .cloned()
            .collect())
    }

    async fn unit_links_of_participant(&mut self, participant_id: ParticipantId) -> Result<Vec<UnitLink>, PortError> {
        let mut rows: Vec<_> = self
            .working
            .unit_links
            .values()
            .filter(|row| row.participant_id == Some(participant_id))
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.transaction_date);
        Ok(rows)
    }

    async fn latest_unit_links(&mut self) -> Result<Vec<UnitLink>, PortError> {
        let mut latest: HashMap<FeeKey, UnitLink> = HashMap::new();
        for row in self.working.unit_links.values() {
            latest
                .entry(FeeKey::from(row))
                .and_modify(|current| {
                    if row.transaction_date > current.transaction_date {
                        *current = row.clone();
                    }
                })
                .or_insert_with(|| row.clone());
        }
        Ok(latest.into_values().collect())
    }

    async fn get_nav(&mut self, product_id: ProductId, date: NaiveDate) -> Result<Option<NetAssetValue>, PortError> {
        Ok(self.working.navs.get(&(product_id, date)).cloned())
    }

    async fn navs_for(&mut self, keys: &[(ProductId, NaiveDate)]) -> Result<Vec<NetAssetValue>, PortError> {
        Ok(keys.iter().filter_map(|key| self.working.navs.get(key).cloned()).collect())
    }

    async fn insert_nav(&mut self, nav: &NetAssetValue) -> Result<(), PortError> {
        let key = (nav.product_id, nav.nav_date);
        if self.working.navs.contains_key(&key) {
            return Err(PortError::conflict(format!(
                "NAV for {} on {} already exists",
                nav.product_id, nav.nav_date
            )));
        }
        self.working.navs.insert(key, nav.clone());
        Ok(())
    }

    async fn update_nav(&mut self, nav: &NetAssetValue) -> Result<(), PortError> {
        match self.working.navs.get_mut(&(nav.product_id, nav.nav_date)) {
            Some(slot) => {
                *slot = nav.clone();
                Ok(())
            }
            None => Err(PortError::not_found("NetAssetValue", nav.id)),
        }
    }

    async fn insert_transaction_fee(&mut self, fee: &TransactionFee) -> Result<(), PortError> {
        self.check(FailPoint::InsertTransactionFee)?;
        self.working.transaction_fees.push(fee.clone());
        Ok(())
    }

    async fn transaction_fees(&mut self, key: &FeeKey) -> Result<Vec<TransactionFee>, PortError> {
        Ok(self
            .working
            .transaction_fees
            .iter()
            .filter(|fee| &fee.key() == key)
            .cloned()
            .collect())
    }

    async fn fee_executed(&mut self, key: &FeeKey, period: FeePeriod) -> Result<bool, PortError> {
        Ok(self.working.fee_executions.contains(&(*key, period)))
    }

    async fn record_fee_execution(&mut self, execution: &FeeExecution) -> Result<(), PortError> {
        if !self.working.fee_executions.insert((execution.key, execution.period)) {
            return Err(PortError::conflict(format!(
                "fee already executed for {} in {}",
                execution.key.product_id, execution.period
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ReferenceRepository for MemoryUnitOfWork {
    async fn fee_configuration(&mut self) -> Result<FeeConfiguration, PortError> {
        Ok(self.working.fee_configuration)
    }

    async fn insert_company(&mut self, company: &Company) -> Result<(), PortError> {
        insert_new(&mut self.working.companies, company.id, company, "Company")
    }

    async fn get_company(&mut self, id: CompanyId) -> Result<Option<Company>, PortError> {
        Ok(self.working.companies.get(&id).cloned())
    }

    async fn update_company(&mut self, company: &Company) -> Result<(), PortError> {
        replace(&mut self.working.companies, company.id, company, "Company")
    }

    async fn insert_customer(&mut self, customer: &Customer) -> Result<(), PortError> {
        insert_new(&mut self.working.customers, customer.id, customer, "Customer")
    }

    async fn get_customer(&mut self, id: CustomerId) -> Result<Option<Customer>, PortError> {
        Ok(self.working.customers.get(&id).cloned())
    }

    async fn update_customer(&mut self, customer: &Customer) -> Result<(), PortError> {
        replace(&mut self.working.customers, customer.id, customer, "Customer")
    }

    async fn insert_participant(&mut self, participant: &Participant) -> Result<(), PortError> {
        insert_new(&mut self.working.participants, participant.id, participant, "Participant")
    }

    async fn get_participant(&mut self, id: ParticipantId) -> Result<Option<Participant>, PortError> {
        Ok(self.working.participants.get(&id).cloned())
    }

    async fn active_participants(&mut self, company_id: CompanyId) -> Result<Vec<Participant>, PortError> {
        let mut participants: Vec<_> = self
            .working
            .participants
            .values()
            .filter(|p| p.company_id == Some(company_id) && p.is_active)
            .cloned()
            .collect();
        participants.sort_by_key(|p| p.created_at);
        Ok(participants)
    }

    async fn insert_claim(&mut self, claim: &Claim) -> Result<(), PortError> {
        insert_new(&mut self.working.claims, claim.id, claim, "Claim")
    }

    async fn get_claim(&mut self, id: ClaimId) -> Result<Option<Claim>, PortError> {
        Ok(self.working.claims.get(&id).cloned())
    }

    async fn update_claim(&mut self, claim: &Claim) -> Result<(), PortError> {
        replace(&mut self.working.claims, claim.id, claim, "Claim")
    }

    async fn insert_ticket(&mut self, ticket: &Ticket) -> Result<(), PortError> {
        insert_new(&mut self.working.tickets, ticket.id, ticket, "Ticket")
    }

    async fn get_ticket(&mut self, id: TicketId) -> Result<Option<Ticket>, PortError> {
        Ok(self.working.tickets.get(&id).cloned())
    }

    async fn update_ticket(&mut self, ticket: &Ticket) -> Result<(), PortError> {
        replace(&mut self.working.tickets, ticket.id, ticket, "Ticket")
    }

    async fn insert_benefit_participation(&mut self, benefit: &BenefitParticipation) -> Result<(), PortError> {
        insert_new(&mut self.working.benefits, benefit.id, benefit, "BenefitParticipation")
    }

    async fn get_benefit_participation(
        &mut self,
        id: BenefitParticipationId,
    ) -> Result<Option<BenefitParticipation>, PortError> {
        Ok(self.working.benefits.get(&id).cloned())
    }

    async fn update_benefit_participation(&mut self, benefit: &BenefitParticipation) -> Result<(), PortError> {
        replace(&mut self.working.benefits, benefit.id, benefit, "BenefitParticipation")
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        self.check(FailPoint::Commit)?;
        let MemoryUnitOfWork { mut guard, working, .. } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::ProgramType;

    fn key() -> UnitLinkKey {
        UnitLinkKey {
            transaction_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            customer_id: None,
            participant_id: Some(ParticipantId::new()),
            product_id: ProductId::new(),
            unit_type: ProgramType::Dkp,
        }
    }

    #[tokio::test]
    async fn test_drop_rolls_back() {
        let store = MemoryStore::new();
        let key = key();
        {
            let mut uow = store.begin().await.unwrap();
            uow.accumulate_unit_link(&key, Decimal::ONE_HUNDRED).await.unwrap();
        }
        assert!(store.snapshot().await.unit_links.is_empty());
    }

    #[tokio::test]
    async fn test_commit_persists_and_accumulates() {
        let store = MemoryStore::new();
        let key = key();
        for _ in 0..2 {
            let mut uow = store.begin().await.unwrap();
            uow.accumulate_unit_link(&key, Decimal::ONE_HUNDRED).await.unwrap();
            uow.commit().await.unwrap();
        }
        let state = store.snapshot().await;
        assert_eq!(state.unit_links[&key].total_amount, Decimal::from(200));
    }

    #[tokio::test]
    async fn test_injected_commit_failure_discards_writes() {
        let store = MemoryStore::new();
        store.fail_on(FailPoint::Commit);
        let mut uow = store.begin().await.unwrap();
        uow.accumulate_unit_link(&key(), Decimal::ONE).await.unwrap();
        assert!(uow.commit().await.is_err());
        assert!(store.snapshot().await.unit_links.is_empty());
    }
}
