//! Property-Based Test Generators
//!
//! Proptest strategies producing values that respect domain invariants.

use core_kernel::{Percent, ProductId};
use domain_investment::Allocation;
use domain_party::Contribution;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Positive currency amounts with up to two decimals
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Percentages in [0, 100] with two decimals
pub fn percentage_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..=10000u32).prop_map(|n| Decimal::new(n as i64, 2))
}

pub fn percent_strategy() -> impl Strategy<Value = Percent> {
    percentage_strategy().prop_map(|value| Percent::new(value).unwrap())
}

/// Unit prices between 1.0000 and 10,000.0000
pub fn nav_strategy() -> impl Strategy<Value = Decimal> {
    (10_000i64..100_000_000i64).prop_map(|n| Decimal::new(n, 4))
}

/// Unit balances with eight decimals
pub fn units_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000_000i64).prop_map(|n| Decimal::new(n, 8))
}

/// Whole-currency monthly contributions
pub fn contribution_strategy() -> impl Strategy<Value = Contribution> {
    (0i64..5_000_000, 0i64..5_000_000, 0i64..1_000_000, 0i64..1_000_000).prop_map(
        |(employer, employee, voluntary, education)| Contribution {
            employer: Decimal::from(employer),
            employee: Decimal::from(employee),
            voluntary: Decimal::from(voluntary),
            education_fund: Decimal::from(education),
        },
    )
}

/// One to four allocations over distinct products
pub fn allocations_strategy() -> impl Strategy<Value = Vec<Allocation>> {
    prop::collection::vec(percent_strategy(), 1..=4).prop_map(|percents| {
        percents
            .into_iter()
            .enumerate()
            .map(|(index, percent)| Allocation {
                product_id: ProductId::from_uuid(Uuid::from_u128(index as u128 + 1)),
                percent,
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_amounts_are_positive(amount in amount_strategy()) {
            prop_assert!(amount > Decimal::ZERO);
        }

        #[test]
        fn test_allocation_products_are_distinct(allocations in allocations_strategy()) {
            let mut ids: Vec<_> = allocations.iter().map(|a| a.product_id).collect();
            ids.dedup();
            prop_assert_eq!(ids.len(), allocations.len());
        }
    }
}
