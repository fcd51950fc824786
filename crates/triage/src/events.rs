//! Event filtering and ranking.

use tracing::debug;

use crate::error::{SourceError, TriageError};
use crate::model::{DiagnosticEvent, EventSeverity, RawEvent};
use crate::source::EventSource;

/// Keep only `Warning`/`Error` events, most recent first.
///
/// The sort is stable: events with equal timestamps keep retrieval order.
/// Events without any timestamp sort after every timestamped one.
pub fn rank_events(raw: Vec<RawEvent>) -> Vec<DiagnosticEvent> {
    let mut events: Vec<DiagnosticEvent> = raw
        .into_iter()
        .filter_map(|event| {
            let severity = EventSeverity::parse(&event.event_type)?;
            Some(DiagnosticEvent {
                severity,
                reason: event.reason,
                message: event.message,
                timestamp: event.timestamp,
            })
        })
        .collect();

    // Option orders None first, so descending puts untimed events last.
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events
}

/// Fetch the actionable events for a pod.
///
/// A failed query fails the whole operation; no partial list is returned.
pub async fn relevant_events(
    source: &dyn EventSource,
    namespace: &str,
    name: &str,
) -> Result<Vec<DiagnosticEvent>, TriageError> {
    let raw = source
        .list_events(namespace, name)
        .await
        .map_err(|source: SourceError| TriageError::EventQuery { source })?;

    let total = raw.len();
    let events = rank_events(raw);
    debug!(total, relevant = events.len(), "Filtered pod events");
    Ok(events)
}
