//! Integration tests for domain_investment

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{CustomerId, InvestmentId, ParticipantId, Percent, ProductId};

use domain_investment::{
    plan_company, plan_individual, split, Allocation, ContributionProfile, FeeConfiguration,
    Holder, InvestmentPayment, ProductShare,
};

fn profile(employer: Decimal, employee: Decimal, voluntary: Decimal, education_fund: Decimal) -> ContributionProfile {
    ContributionProfile {
        participant_id: ParticipantId::new(),
        customer_id: Some(CustomerId::new()),
        employer,
        employee,
        voluntary,
        education_fund,
    }
}

fn pct(value: Decimal) -> Percent {
    Percent::new(value).unwrap()
}

// ============================================================================
// Fee Calculator Tests
// ============================================================================

mod fee_calculator_tests {
    use super::*;

    #[test]
    fn test_two_percent_admin_fee_on_hundred_thousand() {
        let s = split(dec!(100000), Percent::HUNDRED, pct(dec!(2))).unwrap();

        assert_eq!(s.fee, dec!(2000));
        assert_eq!(s.net, dec!(100000));
        assert_eq!(s.gross, dec!(102000));
    }

    #[test]
    fn test_fee_configuration_from_json() {
        let fees: FeeConfiguration =
            serde_json::from_str(r#"{"admin_fee_percent":"2","operational_fee_percent":"0.5"}"#).unwrap();
        assert_eq!(fees.admin_fee_percent, pct(dec!(2)));

        let invalid = serde_json::from_str::<FeeConfiguration>(
            r#"{"admin_fee_percent":"120","operational_fee_percent":"0.5"}"#,
        );
        assert!(invalid.is_err());
    }
}

// ============================================================================
// Individual Origination Tests
// ============================================================================

mod individual_origination_tests {
    use super::*;

    #[test]
    fn test_multiple_allocations_keep_caller_percent() {
        let fees = FeeConfiguration::new(dec!(2), Decimal::ZERO).unwrap();
        let plan = plan_individual(
            dec!(1000000),
            &[
                Allocation { product_id: ProductId::new(), percent: pct(dec!(60)) },
                Allocation { product_id: ProductId::new(), percent: pct(dec!(40)) },
            ],
            Holder { participant_id: None, customer_id: Some(CustomerId::new()) },
            &fees,
        )
        .unwrap();

        assert_eq!(plan.items.len(), 2);
        assert_eq!(plan.items[0].split.net, dec!(600000));
        assert_eq!(plan.items[1].split.net, dec!(400000));
        assert_eq!(plan.total_gross(), dec!(1020000));
        assert!(plan.diff_ratio.is_none());
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let result = plan_individual(
            Decimal::ZERO,
            &[Allocation { product_id: ProductId::new(), percent: Percent::HUNDRED }],
            Holder::default(),
            &FeeConfiguration::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_no_allocations_rejected() {
        let result = plan_individual(dec!(1), &[], Holder::default(), &FeeConfiguration::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_items_and_payment_from_plan() {
        let fees = FeeConfiguration::new(dec!(2), Decimal::ZERO).unwrap();
        let plan = plan_individual(
            dec!(100000),
            &[Allocation { product_id: ProductId::new(), percent: pct(dec!(10)) }],
            Holder::default(),
            &fees,
        )
        .unwrap();
        let investment_id = InvestmentId::new();
        let items = plan.items_for(investment_id);
        let payment = InvestmentPayment::for_items(investment_id, &items);

        assert!(items.iter().all(|item| item.investment_id == investment_id));
        assert_eq!(items[0].percent, Percent::HUNDRED);
        assert_eq!(payment.amount, dec!(102000));
    }
}

// ============================================================================
// Company Origination Tests
// ============================================================================

mod company_origination_tests {
    use super::*;

    #[test]
    fn test_half_funded_batch_halves_every_sub_amount() {
        let first = profile(dec!(600000), dec!(300000), dec!(50000), dec!(50000));
        let second = profile(dec!(500000), dec!(250000), dec!(150000), dec!(100000));
        let fees = FeeConfiguration::new(dec!(1), Decimal::ZERO).unwrap();

        let plan = plan_company(
            dec!(1000000),
            &[first, second],
            &[ProductShare { product_id: ProductId::new(), percent: Percent::HUNDRED }],
            &fees,
        )
        .unwrap();

        assert_eq!(plan.diff_ratio, Some(dec!(0.5)));
        let scaled = &plan.contributions[0];
        assert_eq!(scaled.employer, dec!(300000));
        assert_eq!(scaled.employee, dec!(150000));
        assert_eq!(scaled.voluntary, dec!(25000));
        assert_eq!(scaled.education_fund, dec!(25000));
        let scaled = &plan.contributions[1];
        assert_eq!(scaled.employer, dec!(250000));
        assert_eq!(scaled.employee, dec!(125000));
        assert_eq!(scaled.voluntary, dec!(75000));
        assert_eq!(scaled.education_fund, dec!(50000));
    }

    #[test]
    fn test_one_item_per_participant_and_product() {
        let participants = [
            profile(dec!(100), dec!(100), Decimal::ZERO, Decimal::ZERO),
            profile(dec!(300), dec!(100), Decimal::ZERO, Decimal::ZERO),
        ];
        let equity = ProductId::new();
        let bond = ProductId::new();
        let plan = plan_company(
            dec!(600),
            &participants,
            &[
                ProductShare { product_id: equity, percent: pct(dec!(70)) },
                ProductShare { product_id: bond, percent: pct(dec!(30)) },
            ],
            &FeeConfiguration::default(),
        )
        .unwrap();

        assert_eq!(plan.items.len(), 4);
        let first_equity = plan
            .items
            .iter()
            .find(|item| item.product_id == equity && item.holder.participant_id == Some(participants[0].participant_id))
            .unwrap();
        assert_eq!(first_equity.split.net, dec!(140));
        assert_eq!(first_equity.holder.customer_id, participants[0].customer_id);
        assert_eq!(plan.total_gross(), dec!(600));
    }

    #[test]
    fn test_empty_distribution_rejected() {
        let result = plan_company(
            dec!(600),
            &[profile(dec!(100), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)],
            &[],
            &FeeConfiguration::default(),
        );
        assert!(result.is_err());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_split_is_balanced(
        base_cents in 0i64..1_000_000_000_000i64,
        percent_bp in 0i64..=10_000i64,
        admin_bp in 0i64..=10_000i64,
    ) {
        let s = split(
            Decimal::new(base_cents, 2),
            pct(Decimal::new(percent_bp, 2)),
            pct(Decimal::new(admin_bp, 2)),
        )
        .unwrap();
        prop_assert_eq!(s.gross, s.net + s.fee);
        prop_assert!(s.fee >= Decimal::ZERO);
    }

    #[test]
    fn prop_company_items_are_balanced_and_proportional(
        amounts in proptest::collection::vec(1i64..10_000_000i64, 1..6),
        requested in 1i64..100_000_000i64,
    ) {
        let participants: Vec<_> = amounts
            .iter()
            .map(|a| profile(Decimal::from(*a), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO))
            .collect();
        let fees = FeeConfiguration::new(dec!(2), Decimal::ZERO).unwrap();
        let plan = plan_company(
            Decimal::from(requested),
            &participants,
            &[ProductShare { product_id: ProductId::new(), percent: Percent::HUNDRED }],
            &fees,
        )
        .unwrap();
        let ratio = plan.diff_ratio.unwrap();

        for (original, scaled) in participants.iter().zip(plan.contributions.iter()) {
            prop_assert_eq!(scaled.employer, original.employer * ratio);
        }
        for item in plan.items_for(InvestmentId::new()) {
            prop_assert!(item.is_balanced());
        }
    }
}
