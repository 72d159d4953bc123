//! Pension batch interface
//!
//! Operational entry point for the unit engine: schema migrations, NAV
//! publication, the monthly fee run and manual approval handling, all
//! against PostgreSQL.

pub mod commands;
pub mod config;
pub mod notifier;

pub use commands::{run, Cli, Command};
pub use config::{BatchConfig, ConfigurationError};
pub use notifier::LogNotifier;
