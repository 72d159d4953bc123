//! Net Asset Value (NAV) publication
//!
//! At most one NAV exists per (product, date). A publication batch is split
//! into rows to create and rows to update before it is persisted.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{NavId, ProductId};
use crate::error::FundError;

/// A published unit price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetAssetValue {
    /// Unique identifier
    pub id: NavId,
    /// Product the price belongs to
    pub product_id: ProductId,
    /// Valuation date
    pub nav_date: NaiveDate,
    /// Price of one unit
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NetAssetValue {
    /// Creates a new NAV record
    pub fn new(product_id: ProductId, nav_date: NaiveDate, amount: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: NavId::new_v7(),
            product_id,
            nav_date,
            amount,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One entry of a publication batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavPublication {
    pub product_id: ProductId,
    pub nav_date: NaiveDate,
    pub amount: Decimal,
}

impl NavPublication {
    pub fn validate(&self) -> Result<(), FundError> {
        if self.amount <= Decimal::ZERO {
            return Err(FundError::InvalidNav(self.amount));
        }
        Ok(())
    }
}

/// A batch partitioned against the NAVs already stored
#[derive(Debug, Clone, Default)]
pub struct PublicationPlan {
    pub creates: Vec<NetAssetValue>,
    pub updates: Vec<NetAssetValue>,
}

impl PublicationPlan {
    /// Distinct (product, date) pairs touched by the plan
    pub fn touched(&self) -> Vec<(ProductId, NaiveDate)> {
        self.creates
            .iter()
            .chain(self.updates.iter())
            .map(|nav| (nav.product_id, nav.nav_date))
            .collect()
    }
}

/// Splits a publication batch into new and existing rows
///
/// `existing` must contain the stored NAVs for the (product, date) pairs of
/// the batch. When the batch names the same pair twice the last entry wins.
pub fn plan_publication(
    batch: &[NavPublication],
    existing: &[NetAssetValue],
) -> Result<PublicationPlan, FundError> {
    let mut latest: HashMap<(ProductId, NaiveDate), Decimal> = HashMap::new();
    let mut order = Vec::new();
    for publication in batch {
        publication.validate()?;
        let key = (publication.product_id, publication.nav_date);
        if latest.insert(key, publication.amount).is_none() {
            order.push(key);
        }
    }

    let mut plan = PublicationPlan::default();
    for key in order {
        let amount = latest[&key];
        match existing.iter().find(|nav| (nav.product_id, nav.nav_date) == key) {
            Some(stored) => {
                let mut updated = stored.clone();
                updated.amount = amount;
                updated.updated_at = Utc::now();
                plan.updates.push(updated);
            }
            None => plan.creates.push(NetAssetValue::new(key.0, key.1, amount)),
        }
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_plan_splits_new_and_existing() {
        let product = ProductId::new();
        let day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let next = day.succ_opt().unwrap();
        let stored = NetAssetValue::new(product, day, dec!(480));

        let plan = plan_publication(
            &[
                NavPublication { product_id: product, nav_date: day, amount: dec!(500) },
                NavPublication { product_id: product, nav_date: next, amount: dec!(505) },
            ],
            &[stored.clone()],
        )
        .unwrap();

        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].id, stored.id);
        assert_eq!(plan.updates[0].amount, dec!(500));
        assert_eq!(plan.creates.len(), 1);
        assert_eq!(plan.creates[0].nav_date, next);
    }

    #[test]
    fn test_last_duplicate_wins() {
        let product = ProductId::new();
        let day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let plan = plan_publication(
            &[
                NavPublication { product_id: product, nav_date: day, amount: dec!(500) },
                NavPublication { product_id: product, nav_date: day, amount: dec!(510) },
            ],
            &[],
        )
        .unwrap();
        assert_eq!(plan.creates.len(), 1);
        assert_eq!(plan.creates[0].amount, dec!(510));
    }

    #[test]
    fn test_non_positive_nav_rejected() {
        let publication = NavPublication {
            product_id: ProductId::new(),
            nav_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            amount: Decimal::ZERO,
        };
        assert!(matches!(
            plan_publication(&[publication], &[]),
            Err(FundError::InvalidNav(_))
        ));
    }
}
