//! Monthly Fee Engine
//!
//! Collects the operational fee by diluting units: no cash moves, each
//! holding's latest ledger row loses `ip * fee%` worth of units and an
//! audit row is appended.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use core_kernel::FeePeriod;
use domain_fund::{FeeExecution, FeeKey, OperationFee, TransactionFee};

use crate::error::ServiceError;
use crate::ports::Store;

/// Whether a period may be charged more than once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPolicy {
    /// Charge each holding at most once per period
    #[default]
    OncePerPeriod,
    /// Charge on every run
    Repeat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRunSummary {
    pub charged: usize,
    pub skipped_already_run: usize,
    pub skipped_no_nav: usize,
    pub total_fee: Decimal,
}

pub struct MonthlyFeeEngine {
    store: Arc<dyn Store>,
}

impl MonthlyFeeEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Charges every holding for `period` in one unit of work
    ///
    /// Only the latest row of a holding is considered; a holding whose latest
    /// row is unpriced or has no same-day NAV is skipped, not charged on an
    /// older row.
    #[instrument(skip(self), fields(period = %period))]
    pub async fn run(&self, period: FeePeriod, policy: RunPolicy) -> Result<FeeRunSummary, ServiceError> {
        let mut uow = self.store.begin().await?;
        let percent = uow.fee_configuration().await?.operational_fee_percent;

        let mut rows = uow.latest_unit_links().await?;
        rows.sort_by_key(|row| (row.product_id.to_string(), row.transaction_date, row.id.to_string()));

        let mut summary = FeeRunSummary::default();
        for mut row in rows {
            let key = FeeKey::from(&row);
            if policy == RunPolicy::OncePerPeriod && uow.fee_executed(&key, period).await? {
                summary.skipped_already_run += 1;
                continue;
            }
            let nav = if row.is_priced() {
                uow.get_nav(row.product_id, row.transaction_date).await?
            } else {
                None
            };
            let Some(nav) = nav else {
                debug!(unit_link_id = %row.id, date = %row.transaction_date, "latest row has no same-day NAV");
                summary.skipped_no_nav += 1;
                continue;
            };

            let fee = OperationFee::compute(row.ip, nav.amount, percent)?;
            uow.insert_transaction_fee(&TransactionFee::record(&row, period, &fee)).await?;
            row.dilute(fee.diff)?;
            uow.update_unit_link(&row).await?;
            if policy == RunPolicy::OncePerPeriod {
                uow.record_fee_execution(&FeeExecution::new(key, period)).await?;
            }

            debug!(unit_link_id = %row.id, diff = %fee.diff, fee = %fee.operation_fee, "holding diluted");
            summary.charged += 1;
            summary.total_fee += fee.operation_fee;
        }
        uow.commit().await?;

        info!(
            charged = summary.charged,
            skipped_already_run = summary.skipped_already_run,
            skipped_no_nav = summary.skipped_no_nav,
            total_fee = %summary.total_fee,
            ?policy,
            "monthly fee run finished"
        );
        Ok(summary)
    }
}
