//! Reimburse summary scheduler.
//!
//! Periodically snapshots every user's pending expenses into summaries.
//!
//! Usage:
//!   reimburse-scheduler            - Run the recurring loop (default)
//!   reimburse-scheduler once       - Run a single pass and exit
//!   reimburse-scheduler user <ID>  - Generate one user's summary and exit

mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use reimburse_core::summary::{SummaryEngine, TriggerType};
use reimburse_db::{ExpenseRepository, SummaryRepository, UserRepository, connect_with};
use reimburse_shared::{AppConfig, AppError};
use reimburse_shared::config::SchedulerConfig;
use reimburse_shared::types::UserId;

#[derive(Parser, Debug)]
#[command(
    name = "reimburse-scheduler",
    about = "Generate pending expense summaries on a schedule",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Run the recurring loop (default command)
    Run,
    /// Run a single pass over every user with pending expenses
    Once,
    /// Generate a manual summary for one user
    User(UserArgs),
}

#[derive(Args, Debug, PartialEq, Eq)]
struct UserArgs {
    /// User to summarize
    user_id: UserId,
    /// Window start (RFC 3339), defaults to the current period start
    #[arg(long)]
    start: Option<DateTime<Utc>>,
    /// Window end (RFC 3339), defaults to now
    #[arg(long)]
    end: Option<DateTime<Utc>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load()
        .map_err(AppError::from)
        .context("Failed to load configuration")?;
    telemetry::init(&config.logging);

    let timezone = parse_timezone(&config.summary.timezone)?;

    let db = connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!(timezone = %timezone, "Connected to database");

    let engine = SummaryEngine::new(
        Arc::new(UserRepository::new(db.clone())),
        Arc::new(ExpenseRepository::new(db.clone())),
        Arc::new(SummaryRepository::new(db)),
        timezone,
    );

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_loop(&engine, &config.scheduler).await,
        Command::Once => {
            run_pass(&engine).await?;
            Ok(())
        }
        Command::User(args) => generate_for_user(&engine, args).await,
    }
}

fn parse_timezone(name: &str) -> Result<Tz, AppError> {
    name.parse()
        .map_err(|e| AppError::Config(format!("invalid summary timezone {name}: {e}")))
}

async fn run_loop(engine: &SummaryEngine, config: &SchedulerConfig) -> anyhow::Result<()> {
    if !config.enabled {
        warn!("Scheduler disabled by configuration, exiting");
        return Ok(());
    }

    let period = Duration::from_secs(config.interval_secs.max(1));
    let mut ticker = tokio::time::interval(period);
    if !config.run_on_start {
        // The first tick fires immediately
        ticker.tick().await;
    }
    info!(interval_secs = period.as_secs(), "Scheduler started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // One failed pass must not stop the loop
                if let Err(e) = run_pass(engine).await {
                    error!(error = %e, "Scheduled summary pass failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, stopping scheduler");
                return Ok(());
            }
        }
    }
}

async fn run_pass(engine: &SummaryEngine) -> anyhow::Result<usize> {
    let started = Utc::now();
    let views = engine
        .generate_all_pending(TriggerType::Scheduled)
        .await
        .context("Summary generation failed")?;

    for view in &views {
        info!(
            summary_id = %view.summary.id,
            user_id = %view.summary.user_id,
            expense_count = view.summary.expense_count,
            total = %view.summary.total_amount,
            "Summary generated"
        );
    }
    info!(
        generated = views.len(),
        elapsed_ms = (Utc::now() - started).num_milliseconds(),
        "Summary pass complete"
    );
    Ok(views.len())
}

async fn generate_for_user(engine: &SummaryEngine, args: UserArgs) -> anyhow::Result<()> {
    let result = engine
        .generate_for_user(args.user_id, TriggerType::Manual, args.start, args.end)
        .await
        .with_context(|| format!("Summary generation failed for user {}", args.user_id))?;

    match result {
        Some(view) => info!(
            summary_id = %view.summary.id,
            expense_count = view.summary.expense_count,
            total = %view.summary.total_amount,
            "Summary generated"
        ),
        None => info!(user_id = %args.user_id, "Nothing pending in window, no summary created"),
    }
    Ok(())
}
