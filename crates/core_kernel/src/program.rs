//! Contribution programs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// The pension program a contribution belongs to
///
/// Investments are originated under one of the programs and the resulting
/// unit-link rows carry the same program as their ledger type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProgramType {
    /// Company-sponsored bulk contribution (DKP)
    Dkp,
    /// Individually sponsored contribution (PPIP)
    Ppip,
}

impl ProgramType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramType::Dkp => "DKP",
            ProgramType::Ppip => "PPIP",
        }
    }
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgramType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DKP" => Ok(ProgramType::Dkp),
            // legacy rows were written as DeletePPIP before the rename
            "PPIP" | "DeletePPIP" => Ok(ProgramType::Ppip),
            other => Err(CoreError::validation(format!("unknown program type '{}'", other))),
        }
    }
}
