//! NAV Publisher
//!
//! Stores daily unit prices and keeps ledger rows priced whichever of the
//! two arrives first:
//!
//! - **correction pass**: after a publish, every row of that (product, date)
//!   is revalued at the new price
//! - **forward pass**: after a payment approval credits rows for a day whose
//!   price is already out, just those rows are priced
//!
//! Both passes are idempotent; a row already carrying the NAV and matching
//! units is left untouched.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use core_kernel::{ParticipantId, ProductId, ProgramType};
use domain_fund::{calculate_value, plan_publication, NavPublication, RepriceOutcome, UnitLink, UnitLinkKey};

use crate::background::BackgroundQueue;
use crate::error::ServiceError;
use crate::ports::{Store, UnitOfWork};

/// Rows written by a publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishSummary {
    pub created: usize,
    pub updated: usize,
}

/// Outcome of a repricing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepriceSummary {
    pub repriced: usize,
    pub unchanged: usize,
    /// Rows left at `nab = 0`
    pub pending: usize,
}

impl RepriceSummary {
    fn record(&mut self, outcome: RepriceOutcome) {
        match outcome {
            RepriceOutcome::Repriced => self.repriced += 1,
            RepriceOutcome::Unchanged => self.unchanged += 1,
            RepriceOutcome::Skipped => self.pending += 1,
        }
    }
}

/// A participant's holding in one product, valued on a date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingValuation {
    pub product_id: ProductId,
    pub unit_type: ProgramType,
    pub ip: Decimal,
    pub nav: Decimal,
    pub value: Decimal,
}

#[derive(Clone)]
pub struct NavPublisher {
    store: Arc<dyn Store>,
    queue: Arc<BackgroundQueue>,
}

async fn reprice(uow: &mut dyn UnitOfWork, row: &mut UnitLink, nav: Decimal) -> Result<RepriceOutcome, ServiceError> {
    let outcome = row.reprice(nav);
    if outcome == RepriceOutcome::Repriced {
        uow.update_unit_link(row).await?;
        debug!(unit_link_id = %row.id, nab = %row.nab, ip = %row.ip, "unit link repriced");
    }
    Ok(outcome)
}

impl NavPublisher {
    pub fn new(store: Arc<dyn Store>, queue: Arc<BackgroundQueue>) -> Self {
        Self { store, queue }
    }

    /// Creates or updates NAVs and queues one correction pass per (product, date)
    #[instrument(skip(self, batch), fields(batch_size = batch.len()))]
    pub async fn publish(&self, batch: &[NavPublication]) -> Result<PublishSummary, ServiceError> {
        let mut seen = HashSet::new();
        let pairs: Vec<_> = batch
            .iter()
            .map(|p| (p.product_id, p.nav_date))
            .filter(|pair| seen.insert(*pair))
            .collect();

        let mut uow = self.store.begin().await?;
        let existing = uow.navs_for(&pairs).await?;
        let plan = plan_publication(batch, &existing)?;
        for nav in &plan.creates {
            uow.insert_nav(nav).await?;
        }
        for nav in &plan.updates {
            uow.update_nav(nav).await?;
        }
        uow.commit().await?;

        let summary = PublishSummary {
            created: plan.creates.len(),
            updated: plan.updates.len(),
        };
        info!(created = summary.created, updated = summary.updated, "NAV published");

        for (product_id, date) in plan.touched() {
            let publisher = self.clone();
            let queued = self.queue.submit(format!("nav-correction:{product_id}:{date}"), async move {
                publisher.correction_pass(product_id, date).await?;
                Ok(())
            });
            if !queued {
                warn!(%product_id, %date, "correction pass not queued");
            }
        }
        Ok(summary)
    }

    /// Reprices every ledger row of `product_id` dated `date`
    #[instrument(skip(self))]
    pub async fn correction_pass(&self, product_id: ProductId, date: NaiveDate) -> Result<RepriceSummary, ServiceError> {
        let mut uow = self.store.begin().await?;
        let nav = uow
            .get_nav(product_id, date)
            .await?
            .ok_or_else(|| ServiceError::not_found("NetAssetValue", format!("{product_id}@{date}")))?;

        let mut summary = RepriceSummary::default();
        for mut row in uow.unit_links_on(product_id, date).await? {
            summary.record(reprice(&mut *uow, &mut row, nav.amount).await?);
        }
        uow.commit().await?;

        info!(
            repriced = summary.repriced,
            unchanged = summary.unchanged,
            pending = summary.pending,
            nav = %nav.amount,
            "correction pass finished"
        );
        Ok(summary)
    }

    /// Prices the rows at `keys` when their day's NAV has been published
    #[instrument(skip(self, keys), fields(keys = keys.len()))]
    pub async fn forward_pass(&self, keys: &[UnitLinkKey]) -> Result<RepriceSummary, ServiceError> {
        let mut uow = self.store.begin().await?;
        let mut summary = RepriceSummary::default();
        for key in keys {
            let Some(mut row) = uow.find_unit_link(key).await? else {
                continue;
            };
            match uow.get_nav(key.product_id, key.transaction_date).await? {
                Some(nav) => summary.record(reprice(&mut *uow, &mut row, nav.amount).await?),
                None => summary.pending += 1,
            }
        }
        uow.commit().await?;

        debug!(repriced = summary.repriced, pending = summary.pending, "forward pass finished");
        Ok(summary)
    }

    /// Values a participant's units per product and program on `date`
    ///
    /// Units of every row dated on or before `date` are summed and priced at
    /// that day's NAV. A product without a NAV for `date` fails the whole
    /// query.
    #[instrument(skip(self))]
    pub async fn valuation(
        &self,
        participant_id: ParticipantId,
        date: NaiveDate,
    ) -> Result<Vec<HoldingValuation>, ServiceError> {
        let mut uow = self.store.begin().await?;
        let mut holdings: BTreeMap<(String, &'static str), (ProductId, ProgramType, Decimal)> = BTreeMap::new();
        for row in uow.unit_links_of_participant(participant_id).await? {
            if row.transaction_date > date {
                continue;
            }
            let entry = holdings
                .entry((row.product_id.to_string(), row.unit_type.as_str()))
                .or_insert((row.product_id, row.unit_type, Decimal::ZERO));
            entry.2 += row.ip;
        }

        let mut valuations = Vec::with_capacity(holdings.len());
        for (product_id, unit_type, ip) in holdings.into_values() {
            let nav = uow.get_nav(product_id, date).await?.ok_or_else(|| {
                ServiceError::validation(format!("no NAV published for product {product_id} on {date}"))
            })?;
            valuations.push(HoldingValuation {
                product_id,
                unit_type,
                ip,
                nav: nav.amount,
                value: calculate_value(ip, nav.amount),
            });
        }
        Ok(valuations)
    }
}
