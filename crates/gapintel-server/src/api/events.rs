//! Server-sent status events for a single report.

use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use futures::stream::{self, Stream};
use gapintel_worker::{
    spawn_status_poller, DbStatusSource, PollerConfig, StatusSnapshot, WorkerError,
};
use uuid::Uuid;

use crate::middleware::{RequestId, UserId};

use super::{map_db_error, ApiError, AppState};

/// GET /api/v1/reports/{id}/events
///
/// Emits a `status` event for the current state and for every change after
/// it. The stream closes after a terminal state; a disconnecting client
/// drops the receiver and stops the poller.
pub(super) async fn report_events(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    // Resolve ownership up front so unknown reports get a normal 404.
    gapintel_db::get_report_status(&state.pool, &user_id, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let source = Arc::new(DbStatusSource::new(state.pool.clone(), user_id));
    let config = PollerConfig::new(Duration::from_secs(state.config.poll_interval_secs))
        .with_keepalive(state.worker.clone());
    let rx = spawn_status_poller(source, id, config);

    tracing::debug!(report_id = %id, request_id = %req_id.0, "status stream opened");

    let events = stream::unfold(rx, |mut rx| async move {
        let item = rx.recv().await?;
        Some((Ok(to_event(item)), rx))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn to_event(item: Result<StatusSnapshot, WorkerError>) -> Event {
    match item {
        Ok(snapshot) => Event::default()
            .event("status")
            .json_data(&snapshot)
            .unwrap_or_else(|_| Event::default().event("status").data(snapshot.status.as_str())),
        Err(e) => Event::default().event("error").data(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gapintel_core::ReportStatus;

    #[test]
    fn error_events_carry_the_message() {
        let id = Uuid::nil();
        // Event has no public accessors; rendering via Debug is enough to see the fields.
        let event = format!("{:?}", to_event(Err(WorkerError::ReportNotFound(id))));
        assert!(event.contains("not found"));
    }

    #[test]
    fn status_events_serialize_snapshot() {
        let snapshot = StatusSnapshot {
            report_id: Uuid::nil(),
            status: ReportStatus::Processing,
            error_message: None,
            updated_at: Utc::now(),
        };
        let event = format!("{:?}", to_event(Ok(snapshot)));
        assert!(event.contains("processing"));
    }
}
