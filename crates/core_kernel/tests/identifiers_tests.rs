//! Unit tests for the identifier newtypes and program type

use core_kernel::{
    InvestmentId, ApprovalId, UnitLinkId, NavId, ProductId, ParticipantId,
    CustomerId, CompanyId, ProgramType,
};
use uuid::Uuid;

mod investment_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(InvestmentId::new(), InvestmentId::new());
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = InvestmentId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = InvestmentId::new_v7();
        let uuid1: Uuid = id1.into();
        let uuid2: Uuid = id2.into();
        assert!(uuid1 < uuid2);
    }

    #[test]
    fn test_from_str_with_and_without_prefix() {
        let original = InvestmentId::new();
        let parsed: InvestmentId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);

        let bare: InvestmentId = original.as_uuid().to_string().parse().unwrap();
        assert_eq!(original, bare);
    }

    #[test]
    fn test_invalid_string_fails() {
        assert!("INV-not-a-uuid".parse::<InvestmentId>().is_err());
    }
}

mod prefix_tests {
    use super::*;

    #[test]
    fn test_prefixes_are_distinct() {
        let prefixes = [
            InvestmentId::prefix(),
            ApprovalId::prefix(),
            UnitLinkId::prefix(),
            NavId::prefix(),
            ProductId::prefix(),
            ParticipantId::prefix(),
            CustomerId::prefix(),
            CompanyId::prefix(),
        ];
        let mut sorted = prefixes.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), prefixes.len());
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = ParticipantId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}

mod program_type_tests {
    use super::*;

    #[test]
    fn test_round_trip_codes() {
        assert_eq!("DKP".parse::<ProgramType>().unwrap(), ProgramType::Dkp);
        assert_eq!("PPIP".parse::<ProgramType>().unwrap(), ProgramType::Ppip);
        assert_eq!(ProgramType::Dkp.to_string(), "DKP");
    }

    #[test]
    fn test_legacy_code_maps_to_ppip() {
        assert_eq!("DeletePPIP".parse::<ProgramType>().unwrap(), ProgramType::Ppip);
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        assert!("DPLK".parse::<ProgramType>().is_err());
    }
}
