//! Pension Unit Application Services
//!
//! Coordinates the domain crates around a transactional [`Store`]:
//!
//! - **Investment Orchestrator**: company bulk (DKP) and individual (PPIP)
//!   investments with their items, payments and approvals
//! - **NAV Publisher**: daily unit prices plus the correction and forward
//!   repricing passes
//! - **Approval Dispatcher**: one callback per approval type, applied in the
//!   same unit of work as the decision
//! - **Monthly Fee Engine**: unit dilution with a per-period execution guard
//!
//! Work that must not block or fail the caller (notices, repricing after an
//! approval) goes through the bounded [`BackgroundQueue`].
//!
//! # Example
//!
//! ```rust,ignore
//! use app_services::{EngineConfig, MemoryStore, PensionEngine};
//!
//! let engine = PensionEngine::new(Arc::new(MemoryStore::new()), notifier, EngineConfig::default())?;
//! let created = engine.orchestrator.create_investment(&request).await?;
//! engine.orchestrator.upload_payment(created.detail.investment.id, "TRF-0001").await?;
//! ```

pub mod background;
pub mod callbacks;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod fee_engine;
pub mod memory;
pub mod nav_publisher;
pub mod orchestrator;
pub mod ports;

pub use background::{BackgroundQueue, QueueStats};
pub use callbacks::{ApprovalCallback, CallbackRegistry, RefRecord};
pub use config::EngineConfig;
pub use dispatcher::{ApprovalDispatcher, ApprovalView};
pub use engine::PensionEngine;
pub use error::ServiceError;
pub use fee_engine::{FeeRunSummary, MonthlyFeeEngine, RunPolicy};
pub use memory::{FailPoint, MemoryState, MemoryStore};
pub use nav_publisher::{HoldingValuation, NavPublisher, PublishSummary, RepriceSummary};
pub use orchestrator::{CreateInvestment, CreatedInvestment, InvestmentOrchestrator, Origination, UploadedPayment};
pub use ports::{
    ApprovalQuery, ApprovalRepository, InvestmentNotice, InvestmentRepository, LedgerRepository, Notifier,
    ReferenceRepository, RejectionNotice, Store, UnitOfWork,
};
