//! Wires the services around one store, notifier and background queue

use std::sync::Arc;

use domain_approval::ApprovalType;

use crate::background::BackgroundQueue;
use crate::callbacks::{
    BenefitParticipationApproval, CallbackRegistry, ClaimApproval, CompanyApproval, CustomerApproval,
    InvestmentApproval, TicketApproval,
};
use crate::config::EngineConfig;
use crate::dispatcher::ApprovalDispatcher;
use crate::error::ServiceError;
use crate::fee_engine::MonthlyFeeEngine;
use crate::nav_publisher::NavPublisher;
use crate::orchestrator::InvestmentOrchestrator;
use crate::ports::{Notifier, Store};

pub struct PensionEngine {
    pub orchestrator: Arc<InvestmentOrchestrator>,
    pub nav: NavPublisher,
    pub approvals: ApprovalDispatcher,
    pub fees: MonthlyFeeEngine,
    queue: Arc<BackgroundQueue>,
    store: Arc<dyn Store>,
}

impl PensionEngine {
    /// Builds every service and the callback registry
    ///
    /// Must be called inside a Tokio runtime: the background worker is
    /// spawned here.
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>, config: EngineConfig) -> Result<Self, ServiceError> {
        let queue = Arc::new(BackgroundQueue::new(config.queue_capacity));
        let orchestrator = Arc::new(InvestmentOrchestrator::new(
            store.clone(),
            queue.clone(),
            notifier.clone(),
            &config,
        ));
        let nav = NavPublisher::new(store.clone(), queue.clone());

        let registry = CallbackRegistry::builder()
            .register(
                ApprovalType::Investment,
                Arc::new(InvestmentApproval::new(store.clone(), nav.clone(), config.timezone)),
            )
            .register(ApprovalType::Company, Arc::new(CompanyApproval::new(store.clone())))
            .register(ApprovalType::Customer, Arc::new(CustomerApproval::new(store.clone())))
            .register(ApprovalType::Claim, Arc::new(ClaimApproval::new(store.clone())))
            .register(ApprovalType::Ticket, Arc::new(TicketApproval::new(store.clone())))
            .register(
                ApprovalType::BenefitParticipation,
                Arc::new(BenefitParticipationApproval::new(
                    store.clone(),
                    orchestrator.clone(),
                    notifier.clone(),
                )),
            )
            .build()?;

        let approvals = ApprovalDispatcher::new(store.clone(), Arc::new(registry), queue.clone(), notifier);
        let fees = MonthlyFeeEngine::new(store.clone());

        Ok(Self {
            orchestrator,
            nav,
            approvals,
            fees,
            queue,
            store,
        })
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn queue(&self) -> &BackgroundQueue {
        &self.queue
    }

    /// Waits for queued jobs, then stops the worker
    pub async fn shutdown(&self) {
        self.queue.wait_idle().await;
        self.queue.shutdown().await;
    }
}
