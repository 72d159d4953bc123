//! Registration status shared by approval-gated records

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PartyError;

/// ```text
/// PENDING -> ACTIVE
///         \-> REJECTED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegistrationStatus {
    Pending,
    Active,
    Rejected,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "PENDING",
            RegistrationStatus::Active => "ACTIVE",
            RegistrationStatus::Rejected => "REJECTED",
        }
    }

    /// Moves a pending registration to `target`
    pub fn decide(&mut self, target: RegistrationStatus) -> Result<(), PartyError> {
        if *self != RegistrationStatus::Pending || target == RegistrationStatus::Pending {
            return Err(PartyError::InvalidStateTransition {
                from: self.to_string(),
                to: target.to_string(),
            });
        }
        *self = target;
        Ok(())
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = PartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RegistrationStatus::Pending),
            "ACTIVE" => Ok(RegistrationStatus::Active),
            "REJECTED" => Ok(RegistrationStatus::Rejected),
            other => Err(PartyError::UnknownStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_can_be_decided() {
        let mut status = RegistrationStatus::Pending;
        status.decide(RegistrationStatus::Active).unwrap();
        assert!(status.decide(RegistrationStatus::Rejected).is_err());
        assert_eq!(status, RegistrationStatus::Active);
    }
}
