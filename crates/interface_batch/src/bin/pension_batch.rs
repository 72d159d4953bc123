//! Pension unit engine batch binary
//!
//! # Usage
//!
//! ```bash
//! pension-batch migrate
//! pension-batch publish-nav --file navs.json
//! pension-batch run-monthly-fee --period 2024-03
//! pension-batch confirm-approval APR-<uuid> --decision approve
//! ```
//!
//! # Environment Variables
//!
//! * `PENSION_DATABASE_URL` - PostgreSQL connection string
//! * `PENSION_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)
//! * `PENSION_JSON_LOGS` - Emit JSON log lines (default: false)
//! * `PENSION_MAX_CONNECTIONS` - Pool size (default: 10)
//! * `PENSION_ENGINE__TIMEZONE` - Business timezone (default: Asia/Jakarta)
//! * `PENSION_ENGINE__QUEUE_CAPACITY` - Background queue size (default: 256)

use clap::Parser;
use interface_batch::{run, BatchConfig, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = BatchConfig::from_env()?;

    init_tracing(&config.log_level, config.json_logs);

    tracing::info!(command = ?cli.command, "Starting pension batch");
    run(cli.command, &config).await
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}
