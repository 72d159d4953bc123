//! Contact details for rejection notices

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    pub name: String,
    /// What was rejected, in words the recipient understands
    pub description: String,
}

/// Records that can tell who should hear about a rejection
pub trait HasContactInfo {
    fn contact_info(&self) -> Option<ContactInfo>;
}
