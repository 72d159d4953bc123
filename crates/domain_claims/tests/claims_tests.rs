//! Integration tests for domain_claims

use rust_decimal_macros::dec;

use core_kernel::ParticipantId;
use domain_claims::{Claim, ClaimError, ClaimStatus, ClaimType};

mod claim_lifecycle_tests {
    use super::*;

    #[test]
    fn test_approved_claim_can_be_paid() {
        let mut claim = Claim::submit(ParticipantId::new(), ClaimType::Retirement, dec!(5000000), false).unwrap();
        claim.update_status(ClaimStatus::Approved).unwrap();
        claim.update_status(ClaimStatus::Paid).unwrap();
        assert_eq!(claim.status, ClaimStatus::Paid);
    }

    #[test]
    fn test_rejected_claim_cannot_be_paid() {
        let mut claim = Claim::submit(ParticipantId::new(), ClaimType::Death, dec!(5000000), true).unwrap();
        claim.update_status(ClaimStatus::Rejected).unwrap();
        assert!(matches!(
            claim.update_status(ClaimStatus::Paid),
            Err(ClaimError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_status_strings_parse() {
        for status in [ClaimStatus::Submitted, ClaimStatus::Approved, ClaimStatus::Rejected, ClaimStatus::Paid] {
            assert_eq!(status.as_str().parse::<ClaimStatus>().unwrap(), status);
        }
        for claim_type in [ClaimType::Retirement, ClaimType::Death, ClaimType::Disability, ClaimType::Resignation] {
            assert_eq!(claim_type.as_str().parse::<ClaimType>().unwrap(), claim_type);
        }
    }
}
