//! Repository implementations
//!
//! One module per aggregate. Every function takes the connection of the
//! caller's transaction, so a unit of work can span several repositories.
//! Enumerations are stored as TEXT and parsed back through `FromStr`.

pub mod approval;
pub mod investment;
pub mod ledger;
pub mod reference;

use std::fmt::Display;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::DatabaseError;

/// Key column value standing in for an absent holder
pub(crate) const NO_HOLDER: Uuid = Uuid::nil();

pub(crate) fn parse<T>(column: &str, value: &str) -> Result<T, DatabaseError>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|e| DatabaseError::decode(column, e))
}
