//! Batch configuration
//!
//! Read from `PENSION_`-prefixed environment variables. Nested engine
//! settings use a double underscore, e.g. `PENSION_ENGINE__QUEUE_CAPACITY`.

use app_services::EngineConfig;
use infra_db::DatabaseConfig;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

pub const ENV_PREFIX: &str = "PENSION";

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationErrors),
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct BatchConfig {
    /// PostgreSQL connection string
    #[validate(length(min = 1))]
    pub database_url: String,
    /// Filter directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON log lines instead of the human format
    pub json_logs: bool,
    #[validate(range(min = 1, max = 100))]
    pub max_connections: u32,
    pub engine: EngineConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/pension".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            max_connections: 10,
            engine: EngineConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_environment(Self::environment())
    }

    /// Loads configuration from an explicit environment source
    pub fn from_environment(source: config::Environment) -> Result<Self, ConfigurationError> {
        let config: BatchConfig = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// The `PENSION_` environment source
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.clone()).max_connections(self.max_connections)
    }
}
