//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities of the pension
//! engine. Identifiers and dates are fixed so tests stay predictable.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{CompanyId, FeePeriod, ParticipantId, Percent, ProductId, ProgramType};
use domain_fund::UnitLinkKey;
use domain_investment::FeeConfiguration;
use domain_party::{Company, Contribution, DistributionShare, Participant, RegistrationStatus};
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for deterministic identifiers
pub struct IdFixtures;

impl IdFixtures {
    /// Money market product
    pub fn product_money_market() -> ProductId {
        ProductId::from_uuid(Uuid::from_u128(0x0001))
    }

    /// Fixed income product
    pub fn product_fixed_income() -> ProductId {
        ProductId::from_uuid(Uuid::from_u128(0x0002))
    }

    /// Equity product
    pub fn product_equity() -> ProductId {
        ProductId::from_uuid(Uuid::from_u128(0x0003))
    }

    pub fn company_id() -> CompanyId {
        CompanyId::from_uuid(Uuid::from_u128(0x1000))
    }

    pub fn participant_id() -> ParticipantId {
        ParticipantId::from_uuid(Uuid::from_u128(0x2000))
    }
}

/// Fixture for dates and periods
pub struct DateFixtures;

impl DateFixtures {
    /// A business day with a published NAV in most scenarios
    pub fn trade_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    pub fn next_trade_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 18).unwrap()
    }

    /// Noon in Jakarta on the trade date
    pub fn trade_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 5, 0, 0).unwrap()
    }

    pub fn fee_period() -> FeePeriod {
        FeePeriod::new(2024, 3).unwrap()
    }
}

/// Fixture for fee configuration
pub struct FeeFixtures;

impl FeeFixtures {
    /// 2% admin fee, 1% operational fee
    pub fn standard() -> FeeConfiguration {
        FeeConfiguration::new(dec!(2), dec!(1)).unwrap()
    }

    pub fn free() -> FeeConfiguration {
        FeeConfiguration::default()
    }
}

/// Fixture for reference records
pub struct PartyFixtures;

impl PartyFixtures {
    /// Company split 60/40 across money market and fixed income
    pub fn company_distribution() -> Vec<DistributionShare> {
        vec![
            DistributionShare {
                product_id: IdFixtures::product_money_market(),
                percent: Percent::new(dec!(60)).unwrap(),
            },
            DistributionShare {
                product_id: IdFixtures::product_fixed_income(),
                percent: Percent::new(dec!(40)).unwrap(),
            },
        ]
    }

    /// An approved company with the standard distribution
    pub fn active_company() -> Company {
        let mut company = Company::register(
            "PT Sentosa Abadi",
            "Rina Wulandari",
            "hr@sentosa.example.com",
            Self::company_distribution(),
        )
        .unwrap();
        company.decide(RegistrationStatus::Active).unwrap();
        company
    }

    /// Expected monthly contribution of 1,000,000
    pub fn contribution() -> Contribution {
        Contribution {
            employer: dec!(500000),
            employee: dec!(300000),
            voluntary: dec!(150000),
            education_fund: dec!(50000),
        }
    }

    pub fn member(company_id: CompanyId, name: &str, email: &str) -> Participant {
        Participant::new(Some(company_id), None, name, email, Self::contribution()).unwrap()
    }

    /// An individual participant with no employer
    pub fn individual(name: &str, email: &str) -> Participant {
        Participant::new(None, None, name, email, Contribution::default()).unwrap()
    }
}

/// Fixture for ledger keys
pub struct LedgerFixtures;

impl LedgerFixtures {
    pub fn key(participant_id: ParticipantId, product_id: ProductId, date: NaiveDate) -> UnitLinkKey {
        UnitLinkKey {
            transaction_date: date,
            customer_id: None,
            participant_id: Some(participant_id),
            product_id,
            unit_type: ProgramType::Ppip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_id_fixtures_are_deterministic() {
        assert_eq!(IdFixtures::product_equity(), IdFixtures::product_equity());
        assert_ne!(IdFixtures::product_equity(), IdFixtures::product_money_market());
    }

    #[test]
    fn test_distribution_sums_to_hundred() {
        let total: Decimal = PartyFixtures::company_distribution()
            .iter()
            .map(|share| share.percent.value())
            .sum();
        assert_eq!(total, dec!(100));
    }

    #[test]
    fn test_trade_instant_falls_on_trade_date_in_jakarta() {
        let tz = core_kernel::Timezone::default();
        assert_eq!(tz.date_of(DateFixtures::trade_instant()), DateFixtures::trade_date());
    }
}
