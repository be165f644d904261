use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::*;

/// Replays a fixed script of reads, repeating the last one forever.
struct ScriptedSource {
    script: Mutex<VecDeque<Result<ReportStatus, &'static str>>>,
    reads: AtomicU32,
}

impl ScriptedSource {
    fn new(script: Vec<Result<ReportStatus, &'static str>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            reads: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch_status(&self, report_id: Uuid) -> Result<StatusSnapshot, WorkerError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().await;
        let next = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        match next {
            Some(Ok(status)) => Ok(StatusSnapshot {
                report_id,
                status,
                error_message: None,
                updated_at: Utc::now(),
            }),
            Some(Err("gone")) | None => Err(WorkerError::ReportNotFound(report_id)),
            Some(Err(other)) => Err(WorkerError::Source(other.to_string())),
        }
    }
}

fn fast() -> PollerConfig {
    PollerConfig::new(Duration::from_millis(5))
}

async fn collect(mut rx: mpsc::Receiver<Result<StatusSnapshot, WorkerError>>) -> Vec<String> {
    let mut seen = Vec::new();
    while let Some(event) = rx.recv().await {
        seen.push(match event {
            Ok(s) => s.status.to_string(),
            Err(e) => format!("error: {e}"),
        });
    }
    seen
}

#[tokio::test]
async fn forwards_changes_and_stops_at_terminal() {
    use ReportStatus::{Completed, Pending, Processing};
    let source = ScriptedSource::new(vec![
        Ok(Pending),
        Ok(Pending),
        Ok(Processing),
        Ok(Processing),
        Ok(Completed),
    ]);
    let rx = spawn_status_poller(Arc::clone(&source), Uuid::new_v4(), fast());

    assert_eq!(collect(rx).await, vec!["pending", "processing", "completed"]);
    assert_eq!(source.reads.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn already_terminal_emits_once() {
    let source = ScriptedSource::new(vec![Ok(ReportStatus::Failed)]);
    let rx = spawn_status_poller(Arc::clone(&source), Uuid::new_v4(), fast());
    assert_eq!(collect(rx).await, vec!["failed"]);
    assert_eq!(source.reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transient_errors_are_skipped() {
    let source = ScriptedSource::new(vec![
        Ok(ReportStatus::Pending),
        Err("db down"),
        Ok(ReportStatus::Completed),
    ]);
    let rx = spawn_status_poller(source, Uuid::new_v4(), fast());
    assert_eq!(collect(rx).await, vec!["pending", "completed"]);
}

#[tokio::test]
async fn missing_report_ends_the_watch() {
    let source = ScriptedSource::new(vec![Ok(ReportStatus::Pending), Err("gone")]);
    let rx = spawn_status_poller(source, Uuid::new_v4(), fast());
    let seen = collect(rx).await;
    assert_eq!(seen.len(), 2);
    assert!(seen[1].contains("not found"));
}

#[tokio::test]
async fn dropping_receiver_stops_polling() {
    let source = ScriptedSource::new(vec![Ok(ReportStatus::Pending)]);
    let mut rx = spawn_status_poller(Arc::clone(&source), Uuid::new_v4(), fast());
    assert!(rx.recv().await.is_some());
    drop(rx);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let after_drop = source.reads.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(source.reads.load(Ordering::SeqCst), after_drop);
}

#[tokio::test]
async fn zero_interval_is_clamped_instead_of_panicking() {
    assert!(PollerConfig::new(Duration::ZERO).interval > Duration::ZERO);

    let source = ScriptedSource::new(vec![Ok(ReportStatus::Pending), Ok(ReportStatus::Completed)]);
    let config = PollerConfig {
        interval: Duration::ZERO,
        keepalive: None,
    };
    let rx = spawn_status_poller(source, Uuid::new_v4(), config);
    assert_eq!(collect(rx).await, vec!["pending", "completed"]);
}

#[tokio::test]
async fn slow_keepalive_does_not_delay_status_reads() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let worker = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&worker)
        .await;
    let client = WorkerClient::new(&worker.uri(), 30).expect("client");

    let source = ScriptedSource::new(vec![
        Ok(ReportStatus::Pending),
        Ok(ReportStatus::Pending),
        Ok(ReportStatus::Completed),
    ]);
    let rx = spawn_status_poller(
        Arc::clone(&source),
        Uuid::new_v4(),
        fast().with_keepalive(Some(client)),
    );

    let seen = tokio::time::timeout(Duration::from_secs(2), collect(rx))
        .await
        .expect("keep-alive ping blocked the poll loop");
    assert_eq!(seen, vec!["pending", "completed"]);
    assert_eq!(source.reads.load(Ordering::SeqCst), 3);
}
