//! Report inspection commands.
//!
//! `metrics` runs the dashboard transform on a saved worker payload and needs
//! no database; the rest read `user_reports` for one user.

use std::{path::Path, sync::Arc, time::Duration};

use clap::Subcommand;
use gapintel_core::AppConfig;
use gapintel_metrics::DashboardReport;
use gapintel_worker::{
    spawn_status_poller, DbStatusSource, PollerConfig, StatusSnapshot, WorkerError,
};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Sub-commands available under `report`.
#[derive(Debug, Subcommand)]
pub enum ReportCommands {
    /// List a user's reports, newest first
    List {
        /// Owning user id
        #[arg(long)]
        user: String,
        /// Only reports filed in this folder
        #[arg(long)]
        folder: Option<Uuid>,
        /// Maximum number of reports to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Show one report's lifecycle state
    Status {
        #[arg(long)]
        user: String,
        #[arg(long)]
        id: Uuid,
    },
    /// Follow a report until it completes or fails
    Watch {
        #[arg(long)]
        user: String,
        #[arg(long)]
        id: Uuid,
        /// Poll interval; defaults to the configured interval
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_secs: Option<u64>,
    },
    /// Compute dashboard metrics from a saved `report_data` JSON file
    Metrics {
        #[arg(long)]
        file: std::path::PathBuf,
        /// Keep premium sections in the output
        #[arg(long)]
        premium: bool,
    },
}

/// Dispatch a database-backed `report` sub-command.
///
/// # Errors
///
/// Returns an error if the database query fails or the report is not found.
pub(crate) async fn run(
    command: ReportCommands,
    pool: sqlx::PgPool,
    config: &Arc<AppConfig>,
) -> anyhow::Result<()> {
    match command {
        ReportCommands::List {
            user,
            folder,
            limit,
        } => run_report_list(&pool, &user, folder, limit).await,
        ReportCommands::Status { user, id } => run_report_status(&pool, &user, id).await,
        ReportCommands::Watch {
            user,
            id,
            interval_secs,
        } => {
            let interval = Duration::from_secs(interval_secs.unwrap_or(config.poll_interval_secs));
            run_report_watch(pool, &user, id, interval).await
        }
        ReportCommands::Metrics { file, premium } => run_report_metrics(&file, premium),
    }
}

async fn run_report_list(
    pool: &sqlx::PgPool,
    user: &str,
    folder: Option<Uuid>,
    limit: i64,
) -> anyhow::Result<()> {
    let reports = gapintel_db::list_reports(pool, user, folder, limit.clamp(1, 200)).await?;
    if reports.is_empty() {
        println!("no reports found for user {user}");
        return Ok(());
    }

    println!("{:<38}{:<12}{:<18}CHANNEL", "ID", "STATUS", "CREATED");
    for report in &reports {
        println!(
            "{:<38}{:<12}{:<18}{}",
            report.id,
            report.status,
            report.created_at.format("%Y-%m-%d %H:%M"),
            truncate(&report.channel_name, 40)
        );
    }
    Ok(())
}

async fn run_report_status(pool: &sqlx::PgPool, user: &str, id: Uuid) -> anyhow::Result<()> {
    let row = match gapintel_db::get_report_status(pool, user, id).await {
        Ok(row) => row,
        Err(gapintel_db::DbError::NotFound) => {
            anyhow::bail!("report {id} not found for user {user}")
        }
        Err(e) => return Err(e.into()),
    };
    let status = row.parsed_status()?;

    println!("Report:  {}", row.id);
    println!("Status:  {status}");
    println!("Updated: {}", row.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if let Some(message) = &row.error_message {
        println!("Error:   {message}");
    }
    Ok(())
}

async fn run_report_watch(
    pool: sqlx::PgPool,
    user: &str,
    id: Uuid,
    interval: Duration,
) -> anyhow::Result<()> {
    let source = Arc::new(DbStatusSource::new(pool, user));
    let updates = spawn_status_poller(source, id, PollerConfig::new(interval));
    follow_updates(updates, user, id).await
}

/// Print each status change until the report settles.
///
/// # Errors
///
/// Fails when the report disappears, a read fails fatally, or the poller
/// stops before reporting `completed` or `failed`.
async fn follow_updates(
    mut updates: mpsc::Receiver<Result<StatusSnapshot, WorkerError>>,
    user: &str,
    id: Uuid,
) -> anyhow::Result<()> {
    while let Some(update) = updates.recv().await {
        match update {
            Ok(snapshot) => {
                println!(
                    "{} {}{}",
                    snapshot.updated_at.format("%H:%M:%S"),
                    snapshot.status,
                    snapshot
                        .error_message
                        .as_deref()
                        .map(|m| format!(": {m}"))
                        .unwrap_or_default()
                );
                if snapshot.status.is_terminal() {
                    return Ok(());
                }
            }
            Err(WorkerError::ReportNotFound(_)) => {
                anyhow::bail!("report {id} not found for user {user}")
            }
            Err(e) => return Err(e.into()),
        }
    }
    anyhow::bail!("status watch for report {id} ended before it completed or failed")
}

/// Print the dashboard JSON for a saved worker payload.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid JSON.
pub(crate) fn run_report_metrics(file: &Path, premium: bool) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;
    println!("{}", render_metrics(&raw, premium)?);
    Ok(())
}

/// Parse a `report_data` document and render its dashboard as pretty JSON.
pub(crate) fn render_metrics(raw: &str, premium: bool) -> anyhow::Result<String> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let dashboard = DashboardReport::from_report_data(Some(&value), premium);
    Ok(serde_json::to_string_pretty(&dashboard)?)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}
