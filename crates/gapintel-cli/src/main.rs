mod report;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use gapintel_core::{AppConfig, ChannelInput};
use tracing_subscriber::EnvFilter;

use crate::report::ReportCommands;

#[derive(Debug, Parser)]
#[command(name = "gapintel-cli")]
#[command(about = "GAP Intel operator command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Inspect reports and their metrics
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// YouTube channel tools
    Channel {
        #[command(subcommand)]
        command: ChannelCommands,
    },
    /// Analysis worker tools
    Worker {
        #[command(subcommand)]
        command: WorkerCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check database connectivity
    Ping,
}

#[derive(Debug, Subcommand)]
enum ChannelCommands {
    /// Resolve a channel URL, @handle, channel ID or name
    Lookup {
        /// Anything a user might paste into the channel box
        input: String,
    },
}

#[derive(Debug, Subcommand)]
enum WorkerCommands {
    /// Call the worker's health endpoint once
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("gapintel-cli ready; run with --help to list commands");
        return Ok(());
    };

    match command {
        // Offline: needs no configuration at all.
        Commands::Report {
            command: ReportCommands::Metrics { file, premium },
        } => report::run_report_metrics(&file, premium),
        Commands::Db { command } => {
            let config = gapintel_core::load_app_config()?;
            let pool = connect(&config).await?;
            match command {
                DbCommands::Migrate => {
                    let applied = gapintel_db::run_migrations(&pool).await?;
                    println!("migrations applied: {applied}");
                }
                DbCommands::Ping => {
                    gapintel_db::ping(&pool).await?;
                    println!("database ok");
                }
            }
            Ok(())
        }
        Commands::Report { command } => {
            let config = Arc::new(gapintel_core::load_app_config()?);
            let pool = connect(&config).await?;
            report::run(command, pool, &config).await
        }
        Commands::Channel {
            command: ChannelCommands::Lookup { input },
        } => {
            let config = gapintel_core::load_app_config()?;
            run_channel_lookup(&config, &input).await
        }
        Commands::Worker {
            command: WorkerCommands::Ping,
        } => {
            let config = gapintel_core::load_app_config()?;
            run_worker_ping(&config).await
        }
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = gapintel_db::PoolConfig::from_app_config(config);
    Ok(gapintel_db::connect_pool(&config.database_url, pool_config).await?)
}

async fn run_channel_lookup(config: &AppConfig, raw: &str) -> anyhow::Result<()> {
    let key = config
        .youtube_api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("YOUTUBE_API_KEY is not set"))?;
    let input = ChannelInput::parse(raw)?;
    let client = gapintel_youtube::YoutubeClient::new(
        key,
        config.http_timeout_secs,
        config.http_max_retries,
        config.http_retry_backoff_base_ms,
    )?;

    let info = client.lookup_channel(&input).await?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

async fn run_worker_ping(config: &AppConfig) -> anyhow::Result<()> {
    let url = config
        .worker_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("GAPINTEL_WORKER_URL is not set"))?;
    let worker = gapintel_worker::WorkerClient::new(url, config.http_timeout_secs)?;
    let health = worker.health().await?;
    println!(
        "worker {} at {} ({} ms)",
        health.status,
        worker.health_url(),
        health.latency_ms
    );
    Ok(())
}

#[cfg(test)]
mod tests;
