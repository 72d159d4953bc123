//! Strongly-typed identifiers for domain entities
//!
//! Newtype wrappers around UUIDs. An approval references its record by raw
//! UUID, every other relation goes through one of these types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates a new time-ordered identifier (v7)
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

// Investment identifiers
define_id!(InvestmentId, "INV");
define_id!(InvestmentItemId, "INVI");
define_id!(PaymentId, "PAY");

// Approval identifiers
define_id!(ApprovalId, "APR");

// Fund ledger identifiers
define_id!(UnitLinkId, "UL");
define_id!(NavId, "NAV");
define_id!(TransactionFeeId, "TXF");
define_id!(ProductId, "PRD");

// Reference data identifiers
define_id!(CompanyId, "CMP");
define_id!(CustomerId, "CUS");
define_id!(ParticipantId, "PTC");
define_id!(ClaimId, "CLM");
define_id!(TicketId, "TKT");
define_id!(BenefitParticipationId, "BPT");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_investment_id_display() {
        let id = InvestmentId::new();
        let display = id.to_string();
        assert!(display.starts_with("INV-"));
    }

    #[test]
    fn test_id_parsing() {
        let original = ApprovalId::new();
        let parsed: ApprovalId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_uuid_conversion() {
        let uuid = Uuid::new_v4();
        let participant_id = ParticipantId::from(uuid);
        let back: Uuid = participant_id.into();
        assert_eq!(uuid, back);
    }
}
