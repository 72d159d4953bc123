//! Unit-link ledger rows

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CustomerId, ParticipantId, ProductId, ProgramType, UnitLinkId};
use crate::{calculate_units, calculate_value, round_units};
use crate::error::FundError;

/// The accumulation key of a ledger row
///
/// Contributions posted on the same day for the same holder, product and
/// program land on one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitLinkKey {
    pub transaction_date: NaiveDate,
    pub customer_id: Option<CustomerId>,
    pub participant_id: Option<ParticipantId>,
    pub product_id: ProductId,
    pub unit_type: ProgramType,
}

/// Result of applying a NAV to a ledger row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepriceOutcome {
    /// Price and units were updated
    Repriced,
    /// The row already carried this price and the matching units
    Unchanged,
    /// The NAV was zero; the row stays pending
    Skipped,
}

/// A holder's units in one product for one transaction date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitLink {
    pub id: UnitLinkId,
    pub customer_id: Option<CustomerId>,
    pub participant_id: Option<ParticipantId>,
    pub product_id: ProductId,
    pub unit_type: ProgramType,
    pub transaction_date: NaiveDate,
    /// Net contributions in currency
    pub total_amount: Decimal,
    /// Unit price the row was valued at, zero while pending
    pub nab: Decimal,
    /// Units held
    pub ip: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UnitLink {
    /// Creates a pending-priced row (`nab = 0`, `ip = 0`)
    pub fn pending(key: &UnitLinkKey, amount: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: UnitLinkId::new_v7(),
            customer_id: key.customer_id,
            participant_id: key.participant_id,
            product_id: key.product_id,
            unit_type: key.unit_type,
            transaction_date: key.transaction_date,
            total_amount: amount,
            nab: Decimal::ZERO,
            ip: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> UnitLinkKey {
        UnitLinkKey {
            transaction_date: self.transaction_date,
            customer_id: self.customer_id,
            participant_id: self.participant_id,
            product_id: self.product_id,
            unit_type: self.unit_type,
        }
    }

    /// Adds a contribution; price and units are left for the next repricing
    pub fn accumulate(&mut self, amount: Decimal) {
        self.total_amount += amount;
        self.updated_at = Utc::now();
    }

    /// Returns true once a non-zero price has been applied
    pub fn is_priced(&self) -> bool {
        !self.nab.is_zero()
    }

    /// Values the row at `nav`: `nab = nav`, `ip = total_amount / nav`
    ///
    /// Applying the same NAV twice is a no-op.
    pub fn reprice(&mut self, nav: Decimal) -> RepriceOutcome {
        if nav.is_zero() {
            return RepriceOutcome::Skipped;
        }
        let ip = calculate_units(self.total_amount, nav);
        if self.nab == nav && self.ip == ip {
            return RepriceOutcome::Unchanged;
        }
        self.nab = nav;
        self.ip = ip;
        self.updated_at = Utc::now();
        RepriceOutcome::Repriced
    }

    /// Removes `units` from the holding (operational fee dilution)
    pub fn dilute(&mut self, units: Decimal) -> Result<(), FundError> {
        if units > self.ip {
            return Err(FundError::InsufficientUnits(format!(
                "cannot remove {} units from {} holding {}",
                units, self.id, self.ip
            )));
        }
        self.ip = round_units(self.ip - units);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Zeroes the row after a full payout so it stops accruing value
    pub fn claim(&mut self) {
        self.total_amount = Decimal::ZERO;
        self.nab = Decimal::ZERO;
        self.ip = Decimal::ZERO;
        self.updated_at = Utc::now();
    }

    /// Current value of the units at the given NAV
    pub fn value_at_nav(&self, nav: Decimal) -> Decimal {
        calculate_value(self.ip, nav)
    }
}
