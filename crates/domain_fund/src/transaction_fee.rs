//! Operational fee dilution
//!
//! The monthly operational fee is collected by removing units from the
//! holder's latest ledger row. No cash moves. Each charge leaves a
//! [`TransactionFee`] audit row; a [`FeeExecution`] marker records that a
//! holder/product/program was charged for a period.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CustomerId, FeePeriod, ParticipantId, Percent, ProductId, ProgramType, TransactionFeeId};
use crate::error::FundError;
use crate::unit_link::UnitLink;
use crate::{calculate_units, round_units};

/// Identifies the holding a fee is charged against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeKey {
    pub customer_id: Option<CustomerId>,
    pub participant_id: Option<ParticipantId>,
    pub product_id: ProductId,
    pub unit_type: ProgramType,
}

impl From<&UnitLink> for FeeKey {
    fn from(row: &UnitLink) -> Self {
        Self {
            customer_id: row.customer_id,
            participant_id: row.participant_id,
            product_id: row.product_id,
            unit_type: row.unit_type,
        }
    }
}

/// Result of charging the operational fee on one holding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationFee {
    pub nav: Decimal,
    pub old_ip: Decimal,
    /// Value of the holding before the fee
    pub portfolio_amount: Decimal,
    pub operation_fee: Decimal,
    pub new_portfolio: Decimal,
    pub new_ip: Decimal,
    /// Units removed from the holding
    pub diff: Decimal,
}

impl OperationFee {
    /// Computes the dilution of `ip` units priced at `nav`
    pub fn compute(ip: Decimal, nav: Decimal, percent: Percent) -> Result<Self, FundError> {
        if nav <= Decimal::ZERO {
            return Err(FundError::InvalidNav(nav));
        }
        let portfolio_amount = ip * nav;
        let operation_fee = percent.of(portfolio_amount);
        let new_portfolio = portfolio_amount - operation_fee;
        let new_ip = calculate_units(new_portfolio, nav);
        let diff = round_units(ip - new_ip);
        Ok(Self {
            nav,
            old_ip: ip,
            portfolio_amount,
            operation_fee,
            new_portfolio,
            new_ip,
            diff,
        })
    }
}

/// Append-only audit row of one fee charge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionFee {
    pub id: TransactionFeeId,
    pub customer_id: Option<CustomerId>,
    pub participant_id: Option<ParticipantId>,
    pub product_id: ProductId,
    pub unit_type: ProgramType,
    /// Transaction date of the ledger row that was diluted
    pub transaction_date: NaiveDate,
    pub period: FeePeriod,
    pub nav: Decimal,
    /// Units after the fee
    pub ip: Decimal,
    /// Holding value after the fee
    pub portfolio_amount: Decimal,
    pub operation_fee: Decimal,
    pub created_at: DateTime<Utc>,
}

impl TransactionFee {
    pub fn record(row: &UnitLink, period: FeePeriod, fee: &OperationFee) -> Self {
        Self {
            id: TransactionFeeId::new_v7(),
            customer_id: row.customer_id,
            participant_id: row.participant_id,
            product_id: row.product_id,
            unit_type: row.unit_type,
            transaction_date: row.transaction_date,
            period,
            nav: fee.nav,
            ip: fee.new_ip,
            portfolio_amount: fee.new_portfolio,
            operation_fee: fee.operation_fee,
            created_at: Utc::now(),
        }
    }

    pub fn key(&self) -> FeeKey {
        FeeKey {
            customer_id: self.customer_id,
            participant_id: self.participant_id,
            product_id: self.product_id,
            unit_type: self.unit_type,
        }
    }
}

/// Marker that a holding was charged for a period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeExecution {
    pub key: FeeKey,
    pub period: FeePeriod,
    pub executed_at: DateTime<Utc>,
}

impl FeeExecution {
    pub fn new(key: FeeKey, period: FeePeriod) -> Self {
        Self {
            key,
            period,
            executed_at: Utc::now(),
        }
    }
}
