//! Investment items
//!
//! One item per (investment, product) for individual investments and one per
//! (investment, participant, product) for company bulk investments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CustomerId, InvestmentId, InvestmentItemId, ParticipantId, Percent, ProductId};

use crate::fee::FeeSplit;
use crate::investment::InvestmentStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentItem {
    pub id: InvestmentItemId,
    pub investment_id: InvestmentId,
    pub product_id: ProductId,
    pub participant_id: Option<ParticipantId>,
    pub customer_id: Option<CustomerId>,
    pub percent: Percent,
    /// Gross amount (net + fee)
    pub amount: Decimal,
    pub fee_amount: Decimal,
    /// Net amount credited to the ledger
    pub total_amount: Decimal,
    pub status: InvestmentStatus,
    pub created_at: DateTime<Utc>,
}

impl InvestmentItem {
    pub fn new(
        investment_id: InvestmentId,
        product_id: ProductId,
        participant_id: Option<ParticipantId>,
        customer_id: Option<CustomerId>,
        percent: Percent,
        split: FeeSplit,
    ) -> Self {
        Self {
            id: InvestmentItemId::new_v7(),
            investment_id,
            product_id,
            participant_id,
            customer_id,
            percent,
            amount: split.gross,
            fee_amount: split.fee,
            total_amount: split.net,
            status: InvestmentStatus::Created,
            created_at: Utc::now(),
        }
    }

    /// `amount == total_amount + fee_amount`
    pub fn is_balanced(&self) -> bool {
        self.amount == self.total_amount + self.fee_amount
    }
}
