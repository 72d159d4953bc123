//! Support tickets raised by customers or participants

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::TicketId;
use domain_approval::{ContactInfo, HasContactInfo};

use crate::error::PartyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    Open,
    Resolved,
    Rejected,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "OPEN",
            TicketStatus::Resolved => "RESOLVED",
            TicketStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for TicketStatus {
    type Err = PartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(TicketStatus::Open),
            "RESOLVED" => Ok(TicketStatus::Resolved),
            "REJECTED" => Ok(TicketStatus::Rejected),
            other => Err(PartyError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Ticket {
    pub id: TicketId,
    #[validate(length(min = 1))]
    pub subject: String,
    pub requester_name: String,
    #[validate(email)]
    pub requester_email: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn open(
        subject: impl Into<String>,
        requester_name: impl Into<String>,
        requester_email: impl Into<String>,
    ) -> Result<Self, PartyError> {
        let now = Utc::now();
        let ticket = Self {
            id: TicketId::new_v7(),
            subject: subject.into(),
            requester_name: requester_name.into(),
            requester_email: requester_email.into(),
            status: TicketStatus::Open,
            created_at: now,
            updated_at: now,
        };
        ticket.validate()?;
        Ok(ticket)
    }

    pub fn close(&mut self, status: TicketStatus) -> Result<(), PartyError> {
        if self.status != TicketStatus::Open || status == TicketStatus::Open {
            return Err(PartyError::InvalidStateTransition {
                from: self.status.as_str().to_string(),
                to: status.as_str().to_string(),
            });
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl HasContactInfo for Ticket {
    fn contact_info(&self) -> Option<ContactInfo> {
        Some(ContactInfo {
            email: self.requester_email.clone(),
            name: self.requester_name.clone(),
            description: format!("Ticket: {}", self.subject),
        })
    }
}
