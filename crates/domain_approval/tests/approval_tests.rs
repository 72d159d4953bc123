//! Integration tests for domain_approval

use uuid::Uuid;

use domain_approval::{Approval, ApprovalAction, ApprovalStatus, ApprovalType};

mod approval_type_tests {
    use super::*;

    #[test]
    fn test_every_type_parses_from_its_name() {
        for approval_type in ApprovalType::ALL {
            assert_eq!(approval_type.as_str().parse::<ApprovalType>().unwrap(), approval_type);
        }
        assert!("POLICY".parse::<ApprovalType>().is_err());
    }

    #[test]
    fn test_serde_uses_screaming_case() {
        let json = serde_json::to_string(&ApprovalType::BenefitParticipation).unwrap();
        assert_eq!(json, "\"BENEFIT_PARTICIPATION\"");
    }
}

mod approval_lifecycle_tests {
    use super::*;

    #[test]
    fn test_approve_keeps_detail() {
        let detail = serde_json::json!({ "amount": "102000" });
        let mut approval = Approval::submit(
            Uuid::new_v4(),
            ApprovalType::Investment,
            ApprovalAction::Create,
            Some(detail.clone()),
        );

        approval.decide(ApprovalStatus::Approved, None).unwrap();

        assert_eq!(approval.status, ApprovalStatus::Approved);
        assert_eq!(approval.detail, Some(detail));
        assert!(!approval.is_open());
    }

    #[test]
    fn test_rejection_records_reason() {
        let mut approval = Approval::submit(Uuid::new_v4(), ApprovalType::Company, ApprovalAction::Create, None);
        approval.decide(ApprovalStatus::Rejected, Some("invalid tax id".into())).unwrap();
        assert_eq!(approval.reason.as_deref(), Some("invalid tax id"));
    }
}
