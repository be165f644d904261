//! Background job scheduler.
//!
//! Keeps the analysis worker warm and resets monthly report usage.

use std::sync::Arc;

use gapintel_core::AppConfig;
use gapintel_worker::WorkerClient;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// First second of the first day of every month, UTC.
const MONTHLY_RESET_CRON: &str = "0 0 0 1 * *";

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<AppConfig>,
    worker: Option<WorkerClient>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match worker {
        Some(worker) => {
            register_keepalive_job(&scheduler, worker, &config.worker_keepalive_cron).await?;
        }
        None => tracing::info!("scheduler: no worker configured; keep-alive job skipped"),
    }
    register_usage_reset_job(&scheduler, pool).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Pings the worker's health endpoint so a sleeping free-tier host wakes
/// before users queue reports.
async fn register_keepalive_job(
    scheduler: &JobScheduler,
    worker: WorkerClient,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let worker = worker.clone();
        Box::pin(async move {
            tracing::debug!("scheduler: worker keep-alive");
            worker.keep_alive().await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: registered worker keep-alive job");
    Ok(())
}

async fn register_usage_reset_job(
    scheduler: &JobScheduler,
    pool: PgPool,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async(MONTHLY_RESET_CRON, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        Box::pin(async move {
            tracing::info!("scheduler: starting monthly usage reset");
            match gapintel_db::reset_monthly_usage(&pool).await {
                Ok(rows) => tracing::info!(rows, "scheduler: monthly usage reset complete"),
                Err(e) => tracing::error!(error = %e, "scheduler: monthly usage reset failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = MONTHLY_RESET_CRON, "scheduler: registered monthly usage reset job");
    Ok(())
}
