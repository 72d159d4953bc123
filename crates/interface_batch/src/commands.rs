//! Command line surface and the handlers behind each command

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use app_services::{CreateInvestment, EngineConfig, PensionEngine, RunPolicy};
use core_kernel::{AdapterHealth, ApprovalId, FeePeriod, HealthCheckable, InvestmentId};
use domain_approval::ApprovalStatus;
use domain_fund::NavPublication;
use infra_db::{create_pool, run_migrations, PgStore};

use crate::config::BatchConfig;
use crate::notifier::LogNotifier;

#[derive(Debug, Parser)]
#[command(name = "pension-batch", version, about = "Pension unit engine batch jobs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply pending schema migrations
    Migrate,
    /// Check database connectivity
    Health,
    /// Publish a batch of NAVs from a JSON array of `{product_id, nav_date, amount}`
    PublishNav {
        #[arg(long)]
        file: PathBuf,
    },
    /// Charge the operational fee on the latest holdings
    RunMonthlyFee {
        /// Period as YYYY-MM; defaults to the current business month
        #[arg(long)]
        period: Option<FeePeriod>,
        #[arg(long, value_enum, default_value_t = Policy::OncePerPeriod)]
        policy: Policy,
    },
    /// Approve or reject a pending approval
    ConfirmApproval {
        id: ApprovalId,
        #[arg(long, value_enum)]
        decision: Decision,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Create an investment from a JSON request file
    CreateInvestment {
        #[arg(long)]
        file: PathBuf,
    },
    /// Attach a transfer reference to an investment
    UploadPayment {
        investment: InvestmentId,
        #[arg(long)]
        reference: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Policy {
    OncePerPeriod,
    Repeat,
}

impl From<Policy> for RunPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::OncePerPeriod => RunPolicy::OncePerPeriod,
            Policy::Repeat => RunPolicy::Repeat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Decision {
    Approve,
    Reject,
}

impl From<Decision> for ApprovalStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approve => ApprovalStatus::Approved,
            Decision::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// Runs one command against the configured database
pub async fn run(command: Command, config: &BatchConfig) -> anyhow::Result<()> {
    let pool = create_pool(config.database())
        .await
        .context("connecting to the database")?;

    match command {
        Command::Migrate => {
            run_migrations(&pool).await?;
            info!("Migrations applied");
            Ok(())
        }
        Command::Health => {
            let result = PgStore::new(pool).health_check().await;
            print_json(&result)?;
            if result.status != AdapterHealth::Healthy {
                bail!("database is {:?}", result.status);
            }
            Ok(())
        }
        command => {
            let store = Arc::new(PgStore::new(pool));
            let engine = PensionEngine::new(store, Arc::new(LogNotifier), config.engine.clone())?;
            let outcome = execute(&engine, &config.engine, command).await;
            // Queued notices and repricing finish before the process exits
            engine.shutdown().await;
            print_json(&outcome?)
        }
    }
}

async fn execute(
    engine: &PensionEngine,
    config: &EngineConfig,
    command: Command,
) -> anyhow::Result<serde_json::Value> {
    let value = match command {
        Command::PublishNav { file } => {
            let batch: Vec<NavPublication> = read_json(&file).await?;
            serde_json::to_value(engine.nav.publish(&batch).await?)?
        }
        Command::RunMonthlyFee { period, policy } => {
            let period = period.unwrap_or_else(|| FeePeriod::of(config.timezone.today()));
            info!(%period, ?policy, "Running monthly fee");
            serde_json::to_value(engine.fees.run(period, policy.into()).await?)?
        }
        Command::ConfirmApproval { id, decision, reason } => {
            serde_json::to_value(engine.approvals.confirm(id, decision.into(), reason).await?)?
        }
        Command::CreateInvestment { file } => {
            let request: CreateInvestment = read_json(&file).await?;
            serde_json::to_value(engine.orchestrator.create_investment(&request).await?)?
        }
        Command::UploadPayment { investment, reference } => {
            serde_json::to_value(engine.orchestrator.upload_payment(investment, &reference).await?)?
        }
        Command::Migrate | Command::Health => bail!("command does not need the engine"),
    };
    Ok(value)
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_monthly_fee() {
        let cli = Cli::try_parse_from(["pension-batch", "run-monthly-fee", "--period", "2024-03", "--policy", "repeat"])
            .unwrap();
        match cli.command {
            Command::RunMonthlyFee { period, policy } => {
                assert_eq!(period, Some(FeePeriod::new(2024, 3).unwrap()));
                assert_eq!(RunPolicy::from(policy), RunPolicy::Repeat);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_monthly_fee_defaults_to_once_per_period() {
        let cli = Cli::try_parse_from(["pension-batch", "run-monthly-fee"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::RunMonthlyFee { period: None, policy: Policy::OncePerPeriod }
        ));
    }

    #[test]
    fn test_bad_period_is_rejected() {
        assert!(Cli::try_parse_from(["pension-batch", "run-monthly-fee", "--period", "2024-13"]).is_err());
    }

    #[test]
    fn test_parse_confirm_approval_with_prefixed_id() {
        let id = ApprovalId::new();
        let cli = Cli::try_parse_from([
            "pension-batch".to_string(),
            "confirm-approval".to_string(),
            id.to_string(),
            "--decision".to_string(),
            "reject".to_string(),
            "--reason".to_string(),
            "blurred receipt".to_string(),
        ])
        .unwrap();

        match cli.command {
            Command::ConfirmApproval { id: parsed, decision, reason } => {
                assert_eq!(parsed, id);
                assert_eq!(ApprovalStatus::from(decision), ApprovalStatus::Rejected);
                assert_eq!(reason.as_deref(), Some("blurred receipt"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_upload_payment_requires_reference() {
        let id = InvestmentId::new().to_string();
        assert!(Cli::try_parse_from(["pension-batch", "upload-payment", id.as_str()]).is_err());
    }
}
