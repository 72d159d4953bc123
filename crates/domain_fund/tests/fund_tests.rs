//! Integration tests for domain_fund

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{CustomerId, FeePeriod, ParticipantId, Percent, ProductId, ProgramType};

use domain_fund::{
    calculate_units, plan_publication, FeeExecution, FeeKey, NavPublication, NetAssetValue,
    OperationFee, RepriceOutcome, TransactionFee, UnitLink, UnitLinkKey,
};

fn may_2() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
}

fn ledger_key(product_id: ProductId) -> UnitLinkKey {
    UnitLinkKey {
        transaction_date: may_2(),
        customer_id: Some(CustomerId::new()),
        participant_id: Some(ParticipantId::new()),
        product_id,
        unit_type: ProgramType::Dkp,
    }
}

// ============================================================================
// Unit Link Tests
// ============================================================================

mod unit_link_tests {
    use super::*;

    #[test]
    fn test_row_inserted_before_nav_is_priced_later() {
        let mut row = UnitLink::pending(&ledger_key(ProductId::new()), dec!(100000));
        assert_eq!(row.ip, Decimal::ZERO);

        row.reprice(dec!(500));

        assert_eq!(row.nab, dec!(500));
        assert_eq!(row.ip, row.total_amount / dec!(500));
    }

    #[test]
    fn test_key_round_trips_through_row() {
        let key = ledger_key(ProductId::new());
        let row = UnitLink::pending(&key, dec!(1));
        assert_eq!(row.key(), key);
    }

    #[test]
    fn test_accumulated_row_reprices_to_new_total() {
        let mut row = UnitLink::pending(&ledger_key(ProductId::new()), dec!(100000));
        row.reprice(dec!(500));
        row.accumulate(dec!(100000));

        assert_eq!(row.reprice(dec!(500)), RepriceOutcome::Repriced);
        assert_eq!(row.ip, dec!(400));
    }

    #[test]
    fn test_claim_zeroes_row() {
        let mut row = UnitLink::pending(&ledger_key(ProductId::new()), dec!(100000));
        row.reprice(dec!(500));
        row.claim();

        assert_eq!(row.total_amount, Decimal::ZERO);
        assert_eq!(row.nab, Decimal::ZERO);
        assert_eq!(row.ip, Decimal::ZERO);
    }

    #[test]
    fn test_dilute_more_than_held_fails() {
        let mut row = UnitLink::pending(&ledger_key(ProductId::new()), dec!(1000));
        row.reprice(dec!(10));
        assert!(row.dilute(dec!(101)).is_err());
        assert_eq!(row.ip, dec!(100));
    }

    #[test]
    fn test_value_at_nav() {
        let mut row = UnitLink::pending(&ledger_key(ProductId::new()), dec!(100000));
        row.reprice(dec!(500));
        assert_eq!(row.value_at_nav(dec!(510)), dec!(102000.00));
    }
}

// ============================================================================
// NAV Publication Tests
// ============================================================================

mod nav_publication_tests {
    use super::*;

    #[test]
    fn test_publication_over_existing_keeps_identity() {
        let product = ProductId::new();
        let stored = NetAssetValue::new(product, may_2(), dec!(480));
        let plan = plan_publication(
            &[NavPublication { product_id: product, nav_date: may_2(), amount: dec!(481) }],
            &[stored.clone()],
        )
        .unwrap();

        assert!(plan.creates.is_empty());
        assert_eq!(plan.updates[0].id, stored.id);
        assert_eq!(plan.touched(), vec![(product, may_2())]);
    }

    #[test]
    fn test_negative_amount_rejects_whole_batch() {
        let product = ProductId::new();
        let result = plan_publication(
            &[
                NavPublication { product_id: product, nav_date: may_2(), amount: dec!(500) },
                NavPublication { product_id: product, nav_date: may_2(), amount: dec!(-1) },
            ],
            &[],
        );
        assert!(result.is_err());
    }
}

// ============================================================================
// Operation Fee Tests
// ============================================================================

mod operation_fee_tests {
    use super::*;

    #[test]
    fn test_audit_row_records_post_fee_values() {
        let mut row = UnitLink::pending(&ledger_key(ProductId::new()), dec!(100000));
        row.reprice(dec!(500));
        let period = FeePeriod::new(2024, 5).unwrap();
        let fee = OperationFee::compute(row.ip, dec!(500), Percent::new(dec!(0.5)).unwrap()).unwrap();

        row.dilute(fee.diff).unwrap();
        let audit = TransactionFee::record(&row, period, &fee);

        assert_eq!(audit.operation_fee, dec!(500));
        assert_eq!(audit.portfolio_amount, dec!(99500));
        assert_eq!(audit.ip, row.ip);
        assert_eq!(audit.key(), FeeKey::from(&row));
    }

    #[test]
    fn test_two_charges_remove_more_than_one() {
        let percent = Percent::new(dec!(1)).unwrap();
        let once = OperationFee::compute(dec!(200), dec!(500), percent).unwrap();
        let twice = OperationFee::compute(once.new_ip, dec!(500), percent).unwrap();

        assert!(once.diff + twice.diff > once.diff);
    }

    #[test]
    fn test_execution_marker_carries_period() {
        let row = UnitLink::pending(&ledger_key(ProductId::new()), dec!(1));
        let period = FeePeriod::new(2024, 5).unwrap();
        let marker = FeeExecution::new(FeeKey::from(&row), period);
        assert_eq!(marker.period, period);
        assert_eq!(marker.key.product_id, row.product_id);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_fee_never_increases_units(
        ip_cents in 1i64..10_000_000_000i64,
        nav_cents in 1i64..10_000_000i64,
        fee_bp in 0i64..=10_000i64,
    ) {
        let ip = Decimal::new(ip_cents, 2);
        let nav = Decimal::new(nav_cents, 2);
        let percent = Percent::new(Decimal::new(fee_bp, 2)).unwrap();

        let fee = OperationFee::compute(ip, nav, percent).unwrap();

        prop_assert!(fee.new_ip <= ip);
        prop_assert!(fee.diff >= Decimal::ZERO);
        prop_assert_eq!(fee.portfolio_amount - fee.operation_fee, fee.new_portfolio);
    }

    #[test]
    fn prop_priced_row_matches_units_formula(
        amount_cents in 0i64..100_000_000_000i64,
        nav_cents in 1i64..10_000_000i64,
    ) {
        let mut row = UnitLink::pending(&ledger_key(ProductId::new()), Decimal::new(amount_cents, 2));
        let nav = Decimal::new(nav_cents, 2);
        row.reprice(nav);
        prop_assert_eq!(row.ip, calculate_units(row.total_amount, nav));
        prop_assert_eq!(row.reprice(nav), RepriceOutcome::Unchanged);
    }
}
