//! Item planning for new investments
//!
//! Two algorithms, selected by the investor:
//!
//! - **Individual (PPIP)**: each (product, percent) allocation becomes one
//!   item split from the requested amount. A single allocation always gets
//!   100%, whatever percent the caller sent.
//! - **Company bulk (DKP)**: the requested amount is compared to the sum of
//!   every active participant's expected contribution. Each participant's
//!   contribution is scaled by that ratio and then split across the
//!   company's product distribution.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{CustomerId, InvestmentId, ParticipantId, Percent, ProductId};

use crate::error::InvestmentError;
use crate::fee::{split, FeeConfiguration, FeeSplit};
use crate::item::InvestmentItem;

/// Caller-chosen product share of an individual investment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub product_id: ProductId,
    pub percent: Percent,
}

/// Company-configured product share of a bulk investment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductShare {
    pub product_id: ProductId,
    pub percent: Percent,
}

/// The holder a planned item will be credited to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Holder {
    pub participant_id: Option<ParticipantId>,
    pub customer_id: Option<CustomerId>,
}

/// An active participant's configured monthly contribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionProfile {
    pub participant_id: ParticipantId,
    pub customer_id: Option<CustomerId>,
    pub employer: Decimal,
    pub employee: Decimal,
    pub voluntary: Decimal,
    pub education_fund: Decimal,
}

impl ContributionProfile {
    /// Employer + employee + voluntary + education fund
    ///
    /// `None` when the sum does not fit a `Decimal`.
    pub fn expected(&self) -> Option<Decimal> {
        self.employer
            .checked_add(self.employee)?
            .checked_add(self.voluntary)?
            .checked_add(self.education_fund)
    }

    /// Every sub-amount multiplied by `ratio`
    pub fn scaled(&self, ratio: Decimal) -> Option<Self> {
        Some(Self {
            employer: self.employer.checked_mul(ratio)?,
            employee: self.employee.checked_mul(ratio)?,
            voluntary: self.voluntary.checked_mul(ratio)?,
            education_fund: self.education_fund.checked_mul(ratio)?,
            ..*self
        })
    }

    pub fn holder(&self) -> Holder {
        Holder {
            participant_id: Some(self.participant_id),
            customer_id: self.customer_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedItem {
    pub product_id: ProductId,
    pub holder: Holder,
    pub percent: Percent,
    pub split: FeeSplit,
}

impl PlannedItem {
    pub fn to_item(&self, investment_id: InvestmentId) -> InvestmentItem {
        InvestmentItem::new(
            investment_id,
            self.product_id,
            self.holder.participant_id,
            self.holder.customer_id,
            self.percent,
            self.split,
        )
    }
}

/// Items to persist for a new investment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OriginationPlan {
    /// Requested over expected amount; only set for company bulk plans
    pub diff_ratio: Option<Decimal>,
    /// Scaled contributions used for item generation (company bulk only)
    pub contributions: Vec<ContributionProfile>,
    pub items: Vec<PlannedItem>,
}

impl OriginationPlan {
    pub fn total_gross(&self) -> Decimal {
        self.items.iter().map(|item| item.split.gross).sum()
    }

    pub fn items_for(&self, investment_id: InvestmentId) -> Vec<InvestmentItem> {
        self.items.iter().map(|item| item.to_item(investment_id)).collect()
    }
}

fn too_large(what: &str) -> InvestmentError {
    InvestmentError::validation(format!("{what} is too large to plan"))
}

// Payment and investment totals are summed from these items later.
fn require_total_fits(items: &[PlannedItem]) -> Result<(), InvestmentError> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.split.gross))
        .map(|_| ())
        .ok_or_else(|| too_large("investment total"))
}

fn require_positive(amount: Decimal) -> Result<(), InvestmentError> {
    if amount <= Decimal::ZERO {
        return Err(InvestmentError::validation(format!(
            "investment amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

/// Plans the items of an individual (PPIP) investment
pub fn plan_individual(
    amount: Decimal,
    allocations: &[Allocation],
    holder: Holder,
    fees: &FeeConfiguration,
) -> Result<OriginationPlan, InvestmentError> {
    require_positive(amount)?;
    if allocations.is_empty() {
        return Err(InvestmentError::validation("at least one product allocation is required"));
    }

    let single = allocations.len() == 1;
    let items = allocations
        .iter()
        .map(|allocation| {
            let percent = if single { Percent::HUNDRED } else { allocation.percent };
            Ok(PlannedItem {
                product_id: allocation.product_id,
                holder,
                percent,
                split: split(amount, percent, fees.admin_fee_percent).map_err(|_| too_large("investment amount"))?,
            })
        })
        .collect::<Result<Vec<_>, InvestmentError>>()?;
    require_total_fits(&items)?;

    Ok(OriginationPlan {
        diff_ratio: None,
        contributions: Vec::new(),
        items,
    })
}

/// Plans the items of a company bulk (DKP) investment
pub fn plan_company(
    amount: Decimal,
    participants: &[ContributionProfile],
    distribution: &[ProductShare],
    fees: &FeeConfiguration,
) -> Result<OriginationPlan, InvestmentError> {
    require_positive(amount)?;
    if participants.is_empty() {
        return Err(InvestmentError::validation("company has no active participants"));
    }
    if distribution.is_empty() {
        return Err(InvestmentError::validation("company has no product distribution"));
    }

    let expected = participants
        .iter()
        .try_fold(Decimal::ZERO, |sum, p| p.expected().and_then(|e| sum.checked_add(e)))
        .ok_or_else(|| too_large("expected contribution"))?;
    let diff_ratio = if expected.is_zero() {
        Decimal::ZERO
    } else {
        amount.checked_div(expected).ok_or_else(|| too_large("contribution ratio"))?
    };
    debug!(%amount, %expected, %diff_ratio, participants = participants.len(), "planning company investment");

    let contributions = participants
        .iter()
        .map(|p| p.scaled(diff_ratio).ok_or_else(|| too_large("scaled contribution")))
        .collect::<Result<Vec<_>, _>>()?;
    let mut items = Vec::with_capacity(contributions.len() * distribution.len());
    for contribution in &contributions {
        let base = contribution.expected().ok_or_else(|| too_large("scaled contribution"))?;
        for share in distribution {
            items.push(PlannedItem {
                product_id: share.product_id,
                holder: contribution.holder(),
                percent: share.percent,
                split: split(base, share.percent, fees.admin_fee_percent)
                    .map_err(|_| too_large("scaled contribution"))?,
            });
        }
    }
    require_total_fits(&items)?;

    Ok(OriginationPlan {
        diff_ratio: Some(diff_ratio),
        contributions,
        items,
    })
}
