//! Integration tests for domain_party

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{CompanyId, InvestmentId, ParticipantId, Percent, ProductId};
use domain_approval::HasContactInfo;
use domain_party::{
    BenefitParticipation, Company, Contribution, Customer, DistributionShare, Participant,
    PartyError, RegistrationStatus, Ticket, TicketStatus,
};

mod registration_tests {
    use super::*;

    #[test]
    fn test_company_registration_validates_email() {
        let result = Company::register("PT Maju", "Budi", "not-an-email", Vec::new());
        assert!(matches!(result, Err(PartyError::InvalidData(_))));
    }

    #[test]
    fn test_company_contact_uses_person_in_charge() {
        let company = Company::register(
            "PT Maju",
            "Budi",
            "budi@maju.co.id",
            vec![DistributionShare { product_id: ProductId::new(), percent: Percent::HUNDRED }],
        )
        .unwrap();
        let contact = company.contact_info().unwrap();
        assert_eq!(contact.name, "Budi");
        assert_eq!(contact.email, "budi@maju.co.id");
        assert!(contact.description.contains("PT Maju"));
    }

    #[test]
    fn test_customer_rejection_is_final() {
        let mut customer = Customer::register("Siti", "siti@example.com", None).unwrap();
        customer.decide(RegistrationStatus::Rejected).unwrap();
        assert!(customer.decide(RegistrationStatus::Active).is_err());
    }
}

mod participant_tests {
    use super::*;

    #[test]
    fn test_negative_contribution_rejected() {
        let result = Participant::new(
            Some(CompanyId::new()),
            None,
            "Andi",
            "andi@example.com",
            Contribution { employer: dec!(-1), ..Contribution::default() },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_new_participant_is_active() {
        let mut participant = Participant::new(
            Some(CompanyId::new()),
            None,
            "Andi",
            "andi@example.com",
            Contribution { employer: dec!(500000), employee: dec!(250000), ..Contribution::default() },
        )
        .unwrap();
        assert!(participant.is_active);
        participant.deactivate();
        assert!(!participant.is_active);
    }
}

mod benefit_tests {
    use super::*;

    #[test]
    fn test_benefit_requires_type_and_amount() {
        assert!(BenefitParticipation::request(ParticipantId::new(), "", ProductId::new(), dec!(1)).is_err());
        assert!(BenefitParticipation::request(ParticipantId::new(), "HEALTH", ProductId::new(), Decimal::ZERO).is_err());
    }

    #[test]
    fn test_approval_links_investment() {
        let mut benefit =
            BenefitParticipation::request(ParticipantId::new(), "HEALTH", ProductId::new(), dec!(250000)).unwrap();
        let investment_id = InvestmentId::new();
        benefit.approve(investment_id).unwrap();
        assert_eq!(benefit.status, RegistrationStatus::Active);
        assert_eq!(benefit.investment_id, Some(investment_id));
        assert!(benefit.reject().is_err());
    }
}

mod ticket_tests {
    use super::*;

    #[test]
    fn test_ticket_closes_once() {
        let mut ticket = Ticket::open("Wrong balance", "Siti", "siti@example.com").unwrap();
        ticket.close(TicketStatus::Resolved).unwrap();
        assert!(ticket.close(TicketStatus::Rejected).is_err());
    }
}
