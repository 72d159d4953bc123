//! Seven-digit investment codes
//!
//! Codes are sampled digit by digit. Uniqueness is probed against the store
//! by the caller, which gives up after [`MAX_CODE_ATTEMPTS`] collisions.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::InvestmentError;

/// Number of digits in an investment code
pub const CODE_LENGTH: usize = 7;

/// Collisions tolerated before code generation fails
pub const MAX_CODE_ATTEMPTS: u32 = 10;

/// Unique, human-facing investment reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvestmentCode(String);

impl InvestmentCode {
    pub fn parse(value: impl Into<String>) -> Result<Self, InvestmentError> {
        let value = value.into();
        if value.len() != CODE_LENGTH || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvestmentError::InvalidCode(value));
        }
        Ok(Self(value))
    }

    /// Samples a code from the thread-local generator
    pub fn random() -> Self {
        Self::random_with(&mut rand::thread_rng())
    }

    pub fn random_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..CODE_LENGTH)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvestmentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for InvestmentCode {
    type Error = InvestmentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<InvestmentCode> for String {
    fn from(code: InvestmentCode) -> String {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_code_is_seven_digits() {
        for _ in 0..100 {
            let code = InvestmentCode::random();
            assert_eq!(code.as_str().len(), CODE_LENGTH);
            assert!(InvestmentCode::parse(code.as_str()).is_ok());
        }
    }

    #[test]
    fn test_parse_rejects_letters_and_length() {
        assert!(InvestmentCode::parse("12345a7").is_err());
        assert!(InvestmentCode::parse("123456").is_err());
        assert!(InvestmentCode::parse("0012345").is_ok());
    }
}
