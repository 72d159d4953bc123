//! Investment payments

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ceil_amount, InvestmentId, PaymentId};

use crate::error::InvestmentError;
use crate::item::InvestmentItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting transfer proof
    Pending,
    /// Proof uploaded, awaiting approval
    Confirmed,
    Rejected,
    Success,
    Expired,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Success => "success",
            PaymentStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Rejected | PaymentStatus::Success | PaymentStatus::Expired)
    }

    fn can_transition_to(&self, target: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, target),
            (Pending, Confirmed)
                | (Pending, Expired)
                | (Pending, Rejected)
                | (Confirmed, Success)
                | (Confirmed, Rejected)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = InvestmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "confirmed" => Ok(PaymentStatus::Confirmed),
            "rejected" => Ok(PaymentStatus::Rejected),
            "success" => Ok(PaymentStatus::Success),
            "expired" => Ok(PaymentStatus::Expired),
            other => Err(InvestmentError::validation(format!("unknown payment status {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentPayment {
    pub id: PaymentId,
    pub investment_id: InvestmentId,
    /// Sum of item gross amounts, rounded up
    pub amount: Decimal,
    pub status: PaymentStatus,
    /// Transfer proof supplied on upload
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvestmentPayment {
    /// Creates the pending payment covering `items`
    pub fn for_items(investment_id: InvestmentId, items: &[InvestmentItem]) -> Self {
        let now = Utc::now();
        let gross: Decimal = items.iter().map(|item| item.amount).sum();
        Self {
            id: PaymentId::new_v7(),
            investment_id,
            amount: ceil_amount(gross),
            status: PaymentStatus::Pending,
            reference: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Records the transfer proof and marks the payment confirmed
    pub fn attach_reference(&mut self, reference: impl Into<String>) -> Result<(), InvestmentError> {
        self.transition(PaymentStatus::Confirmed)?;
        self.reference = Some(reference.into());
        Ok(())
    }

    pub fn transition(&mut self, target: PaymentStatus) -> Result<(), InvestmentError> {
        if !self.status.can_transition_to(target) {
            return Err(InvestmentError::transition(self.status, target));
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fee::split;
    use core_kernel::{Percent, ProductId};
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_rounds_sum_up() {
        let investment_id = InvestmentId::new();
        let fee = Percent::new(dec!(1.5)).unwrap();
        let items: Vec<_> = [dec!(333.33), dec!(333.33)]
            .into_iter()
            .map(|base| {
                InvestmentItem::new(investment_id, ProductId::new(), None, None, Percent::HUNDRED, split(base, Percent::HUNDRED, fee).unwrap())
            })
            .collect();

        let payment = InvestmentPayment::for_items(investment_id, &items);
        // 2 * 338.329950 = 676.6599
        assert_eq!(payment.amount, dec!(677));
        assert_eq!(payment.status, PaymentStatus::Pending);
    }

    #[test]
    fn test_payment_needs_proof_before_success() {
        let mut payment = InvestmentPayment::for_items(InvestmentId::new(), &[]);
        assert!(matches!(
            payment.transition(PaymentStatus::Success),
            Err(InvestmentError::InvalidStateTransition { .. })
        ));
        payment.attach_reference("TRX-1").unwrap();
        payment.transition(PaymentStatus::Success).unwrap();
    }

    #[test]
    fn test_terminal_payment_cannot_move() {
        let mut payment = InvestmentPayment::for_items(InvestmentId::new(), &[]);
        payment.attach_reference("TRX-1").unwrap();
        payment.transition(PaymentStatus::Rejected).unwrap();
        assert!(payment.transition(PaymentStatus::Success).is_err());
        assert!(payment.attach_reference("TRX-2").is_err());
    }
}
