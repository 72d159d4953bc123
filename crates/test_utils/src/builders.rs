//! Test Data Builders
//!
//! Builders let tests name only the fields they care about. Names and
//! emails are generated with `fake` unless set explicitly.

use app_services::{CreateInvestment, MemoryStore};
use chrono::NaiveDate;
use core_kernel::{CompanyId, ParticipantId, Percent, ProductId, ProgramType};
use domain_fund::{UnitLink, UnitLinkKey};
use domain_investment::{Allocation, InvestmentSource, Investor};
use domain_party::{Company, Contribution, Participant};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::{DateFixtures, IdFixtures, PartyFixtures};

/// Builder for participants
pub struct ParticipantBuilder {
    company_id: Option<CompanyId>,
    name: String,
    email: String,
    contribution: Contribution,
    active: bool,
}

impl Default for ParticipantBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticipantBuilder {
    /// Creates an individual participant with random name and email
    pub fn new() -> Self {
        Self {
            company_id: None,
            name: Name().fake(),
            email: SafeEmail().fake(),
            contribution: Contribution::default(),
            active: true,
        }
    }

    pub fn member_of(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self.contribution = PartyFixtures::contribution();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_contribution(mut self, contribution: Contribution) -> Self {
        self.contribution = contribution;
        self
    }

    /// Splits `total` evenly over the four contribution kinds
    pub fn with_expected(mut self, total: Decimal) -> Self {
        let quarter = total / dec!(4);
        self.contribution = Contribution {
            employer: quarter,
            employee: quarter,
            voluntary: quarter,
            education_fund: quarter,
        };
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn build(self) -> Participant {
        let mut participant =
            Participant::new(self.company_id, None, self.name, self.email, self.contribution).unwrap();
        if !self.active {
            participant.deactivate();
        }
        participant
    }
}

/// Builder for ledger rows
pub struct UnitLinkBuilder {
    key: UnitLinkKey,
    amount: Decimal,
    nav: Option<Decimal>,
}

impl Default for UnitLinkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitLinkBuilder {
    /// A pending row of 100,000 for the fixture participant and product
    pub fn new() -> Self {
        Self {
            key: UnitLinkKey {
                transaction_date: DateFixtures::trade_date(),
                customer_id: None,
                participant_id: Some(IdFixtures::participant_id()),
                product_id: IdFixtures::product_money_market(),
                unit_type: ProgramType::Ppip,
            },
            amount: dec!(100000),
            nav: None,
        }
    }

    pub fn participant(mut self, participant_id: ParticipantId) -> Self {
        self.key.participant_id = Some(participant_id);
        self
    }

    pub fn product(mut self, product_id: ProductId) -> Self {
        self.key.product_id = product_id;
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.key.transaction_date = date;
        self
    }

    pub fn unit_type(mut self, unit_type: ProgramType) -> Self {
        self.key.unit_type = unit_type;
        self
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    /// Prices the row at `nav`
    pub fn priced_at(mut self, nav: Decimal) -> Self {
        self.nav = Some(nav);
        self
    }

    pub fn build(self) -> UnitLink {
        let mut row = UnitLink::pending(&self.key, self.amount);
        if let Some(nav) = self.nav {
            row.reprice(nav);
        }
        row
    }
}

/// Builder for investment requests
pub struct CreateInvestmentBuilder {
    investor: Investor,
    amount: Decimal,
    allocations: Vec<Allocation>,
    source: InvestmentSource,
}

impl CreateInvestmentBuilder {
    /// Individual request by a participant, no allocations yet
    pub fn participant(participant_id: ParticipantId) -> Self {
        Self {
            investor: Investor::Participant(participant_id),
            amount: dec!(100000),
            allocations: Vec::new(),
            source: InvestmentSource::Regular,
        }
    }

    /// Company bulk request; allocations come from the company distribution
    pub fn company(company_id: CompanyId) -> Self {
        Self {
            investor: Investor::Company(company_id),
            amount: dec!(1000000),
            allocations: Vec::new(),
            source: InvestmentSource::Regular,
        }
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    pub fn allocate(mut self, product_id: ProductId, percent: Decimal) -> Self {
        self.allocations.push(Allocation {
            product_id,
            percent: Percent::new(percent).unwrap(),
        });
        self
    }

    pub fn build(self) -> CreateInvestment {
        CreateInvestment {
            investor: self.investor,
            amount: self.amount,
            allocations: self.allocations,
            source: self.source,
        }
    }
}

/// Seeds an active company with one member per expected contribution
pub async fn seed_company(store: &MemoryStore, expected: &[Decimal]) -> (Company, Vec<Participant>) {
    let company = PartyFixtures::active_company();
    let members: Vec<_> = expected
        .iter()
        .map(|amount| ParticipantBuilder::new().member_of(company.id).with_expected(*amount).build())
        .collect();
    let (seeded_company, seeded_members) = (company.clone(), members.clone());
    store
        .seed(move |state| {
            state.companies.insert(seeded_company.id, seeded_company);
            for member in seeded_members {
                state.participants.insert(member.id, member);
            }
        })
        .await;
    (company, members)
}

/// Seeds one individual participant
pub async fn seed_participant(store: &MemoryStore) -> Participant {
    let participant = ParticipantBuilder::new().build();
    let seeded = participant.clone();
    store
        .seed(move |state| {
            state.participants.insert(seeded.id, seeded);
        })
        .await;
    participant
}

/// Seeds ledger rows as they are
pub async fn seed_unit_links(store: &MemoryStore, rows: Vec<UnitLink>) {
    store
        .seed(move |state| {
            for row in rows {
                state.unit_links.insert(row.key(), row);
            }
        })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_builder_defaults() {
        let participant = ParticipantBuilder::new().build();
        assert!(participant.is_active);
        assert!(participant.company_id.is_none());
        assert!(participant.email.contains('@'));
    }

    #[test]
    fn test_with_expected_splits_evenly() {
        let participant = ParticipantBuilder::new().with_expected(dec!(1000)).build();
        assert_eq!(participant.contribution.employer, dec!(250));
        assert_eq!(participant.contribution.education_fund, dec!(250));
    }

    #[test]
    fn test_priced_unit_link() {
        let row = UnitLinkBuilder::new().amount(dec!(1000)).priced_at(dec!(500)).build();
        assert_eq!(row.nab, dec!(500));
        assert_eq!(row.ip, dec!(2));
    }
}
