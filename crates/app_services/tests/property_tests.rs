//! Property tests for origination and unit arithmetic

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_fund::{calculate_units, calculate_value, OperationFee};
use core_kernel::{InvestmentId, Percent};
use domain_investment::{
    plan_company, plan_individual, split, ContributionProfile, FeeConfiguration, Holder, ProductShare,
};
use test_utils::*;

fn profile_of(builder: ParticipantBuilder) -> ContributionProfile {
    let participant = builder.build();
    ContributionProfile {
        participant_id: participant.id,
        customer_id: participant.customer_id,
        employer: participant.contribution.employer,
        employee: participant.contribution.employee,
        voluntary: participant.contribution.voluntary,
        education_fund: participant.contribution.education_fund,
    }
}

proptest! {
    #[test]
    fn prop_split_gross_is_net_plus_fee(
        base in amount_strategy(),
        percent in percent_strategy(),
        admin in percent_strategy(),
    ) {
        let s = split(base, percent, admin).unwrap();
        prop_assert_eq!(s.gross, s.net + s.fee);
        prop_assert!(s.net <= base);
    }

    #[test]
    fn prop_individual_items_follow_allocations(
        amount in amount_strategy(),
        allocations in allocations_strategy(),
        admin in percentage_strategy(),
    ) {
        let fees = FeeConfiguration::new(admin, Decimal::ZERO).unwrap();
        let plan = plan_individual(amount, &allocations, Holder::default(), &fees).unwrap();

        prop_assert_eq!(plan.items.len(), allocations.len());
        prop_assert!(plan.diff_ratio.is_none());
        if allocations.len() == 1 {
            prop_assert_eq!(plan.items[0].percent, Percent::HUNDRED);
            prop_assert_eq!(plan.items[0].split.net, amount);
        }

        let items: Vec<_> = plan.items.iter().map(|item| item.to_item(InvestmentId::new())).collect();
        assert_items_balanced(&items);
    }

    #[test]
    fn prop_company_scaling_matches_requested_amount(
        contributions in prop::collection::vec(contribution_strategy(), 1..5),
        amount in amount_strategy(),
    ) {
        let participants: Vec<_> = contributions
            .into_iter()
            .map(|c| profile_of(ParticipantBuilder::new().member_of(IdFixtures::company_id()).with_contribution(c)))
            .collect();
        let expected: Decimal = participants.iter().map(ContributionProfile::expected).sum::<Option<Decimal>>().unwrap();
        prop_assume!(!expected.is_zero());

        let distribution = [ProductShare { product_id: IdFixtures::product_equity(), percent: Percent::HUNDRED }];
        let plan = plan_company(amount, &participants, &distribution, &FeeFixtures::free()).unwrap();

        let scaled: Decimal = plan.contributions.iter().map(ContributionProfile::expected).sum::<Option<Decimal>>().unwrap();
        assert_decimal_approx_eq(scaled, amount, dec!(0.0001));
        prop_assert_eq!(plan.items.len(), participants.len());
    }

    #[test]
    fn prop_units_value_back_to_amount(amount in amount_strategy(), nav in nav_strategy()) {
        let units = calculate_units(amount, nav);
        assert_decimal_approx_eq(calculate_value(units, nav), amount, dec!(0.01));
    }

    #[test]
    fn prop_fee_dilution_never_adds_units(
        ip in units_strategy(),
        nav in nav_strategy(),
        percent in percent_strategy(),
    ) {
        let fee = OperationFee::compute(ip, nav, percent).unwrap();
        prop_assert!(fee.new_ip <= ip);
        prop_assert_eq!(fee.new_ip + fee.diff, ip);
        prop_assert!(fee.operation_fee >= Decimal::ZERO);
    }
}

#[test]
fn test_builder_expected_splits_evenly() {
    let profile = profile_of(ParticipantBuilder::new().with_expected(dec!(400000)));
    assert_eq!(profile.employer, dec!(100000));
    assert_eq!(profile.expected(), Some(dec!(400000)));
}
