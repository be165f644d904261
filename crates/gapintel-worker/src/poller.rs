//! Fixed-interval status watcher.
//!
//! A poller reads a report's status every `interval` and forwards each
//! change on a channel. It stops on its own once the report reaches a
//! terminal state or disappears, and stops early when the receiver is
//! dropped, so a disconnected viewer ends the loop at the next tick.

use std::sync::Arc;
use std::time::Duration;

use gapintel_core::ReportStatus;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::client::WorkerClient;
use crate::error::WorkerError;
use crate::source::{StatusSnapshot, StatusSource};

const CHANNEL_CAPACITY: usize = 8;
/// `tokio::time::interval` panics on a zero period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
    /// Pinged in the background after every non-terminal read to keep the
    /// worker warm. A slow ping never delays the next status read.
    pub keepalive: Option<WorkerClient>,
}

impl PollerConfig {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
            keepalive: None,
        }
    }

    #[must_use]
    pub fn with_keepalive(mut self, worker: Option<WorkerClient>) -> Self {
        self.keepalive = worker;
        self
    }
}

/// Starts watching `report_id` on a background task.
///
/// The first read happens immediately. Only changes in status or error
/// message are sent. Read failures other than "not found" are logged and
/// retried on the next tick; "not found" is forwarded and ends the watch.
pub fn spawn_status_poller<S: StatusSource>(
    source: Arc<S>,
    report_id: Uuid,
    config: PollerConfig,
) -> mpsc::Receiver<Result<StatusSnapshot, WorkerError>> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(async move {
        run_poller(source.as_ref(), report_id, &config, &tx).await;
    });
    rx
}

async fn run_poller<S: StatusSource + ?Sized>(
    source: &S,
    report_id: Uuid,
    config: &PollerConfig,
    tx: &mpsc::Sender<Result<StatusSnapshot, WorkerError>>,
) {
    let mut ticker = tokio::time::interval(config.interval.max(MIN_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_seen: Option<(ReportStatus, Option<String>)> = None;

    loop {
        tokio::select! {
            () = tx.closed() => {
                tracing::debug!(%report_id, "status watcher dropped, stopping poller");
                return;
            }
            _ = ticker.tick() => {}
        }

        let snapshot = match source.fetch_status(report_id).await {
            Ok(snapshot) => snapshot,
            Err(WorkerError::ReportNotFound(id)) => {
                let _ = tx.send(Err(WorkerError::ReportNotFound(id))).await;
                return;
            }
            Err(e) => {
                tracing::warn!(%report_id, error = %e, "status read failed, will retry");
                continue;
            }
        };

        let terminal = snapshot.status.is_terminal();
        let key = (snapshot.status, snapshot.error_message.clone());
        if last_seen.as_ref() != Some(&key) {
            tracing::info!(%report_id, status = %snapshot.status, "report status changed");
            last_seen = Some(key);
            if tx.send(Ok(snapshot)).await.is_err() {
                return;
            }
        }

        if terminal {
            tracing::debug!(%report_id, "report reached terminal state, stopping poller");
            return;
        }

        if let Some(worker) = &config.keepalive {
            let worker = worker.clone();
            tokio::spawn(async move { worker.keep_alive().await });
        }
    }
}

#[cfg(test)]
#[path = "poller_test.rs"]
mod tests;
