//! Engine configuration

use serde::{Deserialize, Serialize};

use core_kernel::Timezone;
use domain_investment::MAX_CODE_ATTEMPTS;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Background jobs buffered before new ones are dropped
    pub queue_capacity: usize,
    /// Business timezone; decides the transaction date of ledger rows
    pub timezone: Timezone,
    /// Investment code collisions tolerated per create call
    pub code_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            timezone: Timezone::default(),
            code_attempts: MAX_CODE_ATTEMPTS,
        }
    }
}
