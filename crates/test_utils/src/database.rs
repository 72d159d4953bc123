//! PostgreSQL test containers
//!
//! Starts a throwaway `postgres:16-alpine` container, applies the workspace
//! migrations and hands back a [`PgStore`] on it. Tests that use these
//! helpers need Docker and are marked `#[ignore]`.

use std::sync::Arc;
use std::time::Duration;

use infra_db::{run_migrations, PgStore};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};
use tokio::sync::OnceCell;

const POSTGRES_IMAGE: &str = "postgres";
const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "test_user";
const POSTGRES_PASSWORD: &str = "test_password";
const POSTGRES_DB: &str = "pension_test";

/// Tables emptied by [`TestDatabase::clear_data`], children first
const TABLES: &[&str] = &[
    "fee_executions",
    "transaction_fees",
    "net_asset_values",
    "unit_links",
    "approvals",
    "benefit_participations",
    "investment_payments",
    "investment_items",
    "investments",
    "tickets",
    "claims",
    "participants",
    "customers",
    "companies",
];

pub type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone)]
pub struct TestDatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl Default for TestDatabaseConfig {
    fn default() -> Self {
        Self {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host: "localhost".to_string(),
            port: 5432,
        }
    }
}

impl TestDatabaseConfig {
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// A migrated PostgreSQL container, stopped on drop
pub struct TestDatabase {
    _container: ContainerAsync<GenericImage>,
    pub config: TestDatabaseConfig,
    pub pool: PgPool,
}

impl TestDatabase {
    pub async fn new() -> TestResult<Self> {
        let container = GenericImage::new(POSTGRES_IMAGE, POSTGRES_TAG)
            .with_exposed_port(5432.tcp())
            .with_wait_for(WaitFor::message_on_stderr("database system is ready to accept connections"))
            .with_env_var("POSTGRES_USER", POSTGRES_USER)
            .with_env_var("POSTGRES_PASSWORD", POSTGRES_PASSWORD)
            .with_env_var("POSTGRES_DB", POSTGRES_DB)
            .start()
            .await?;

        let config = TestDatabaseConfig {
            host: container.get_host().await?.to_string(),
            port: container.get_host_port_ipv4(5432).await?,
            ..TestDatabaseConfig::default()
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.connection_url())
            .await?;
        run_migrations(&pool).await?;

        Ok(Self {
            _container: container,
            config,
            pool,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn store(&self) -> Arc<PgStore> {
        Arc::new(PgStore::new(self.pool.clone()))
    }

    /// Empties every table and resets the fee configuration to zero
    pub async fn clear_data(&self) -> TestResult<()> {
        let statement = format!("TRUNCATE TABLE {} CASCADE", TABLES.join(", "));
        sqlx::query(&statement).execute(&self.pool).await?;
        sqlx::query("UPDATE fee_configurations SET admin_fee_percent = 0, operational_fee_percent = 0")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_fee_configuration(
        &self,
        admin: rust_decimal::Decimal,
        operational: rust_decimal::Decimal,
    ) -> TestResult<()> {
        sqlx::query("UPDATE fee_configurations SET admin_fee_percent = $1, operational_fee_percent = $2")
            .bind(admin)
            .bind(operational)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

static SHARED_TEST_DB: OnceCell<Arc<TestDatabase>> = OnceCell::const_new();

/// One container shared by every test of the binary
///
/// # Panics
///
/// Panics if the container cannot be started.
pub async fn get_shared_test_database() -> Arc<TestDatabase> {
    SHARED_TEST_DB
        .get_or_init(|| async {
            Arc::new(
                TestDatabase::new()
                    .await
                    .expect("Failed to create shared test database"),
            )
        })
        .await
        .clone()
}

pub async fn create_isolated_test_database() -> TestResult<TestDatabase> {
    TestDatabase::new().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_connection_url() {
        let url = TestDatabaseConfig::default().connection_url();

        assert!(url.starts_with("postgres://"));
        assert!(url.contains(POSTGRES_USER));
        assert!(url.ends_with("/pension_test"));
    }

    #[test]
    fn test_every_table_cleared_once() {
        let mut tables = TABLES.to_vec();
        tables.sort_unstable();
        tables.dedup();
        assert_eq!(tables.len(), TABLES.len());
    }
}
