//! Concurrent log collection for failed containers.
//!
//! One worker per container runs in a [`JoinSet`]. Each worker fetches the
//! previous-run tail, then the current-run tail, and hands back its slot
//! index with the result. Every failure below the worker (missing previous
//! run, unreachable container, timeout, cancellation, even a panic) is
//! recorded in that slot and never affects the other workers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::SourceError;
use crate::model::{
    ClassifiedComponent, ComponentLogs, LogFetchFailure, LogFetchOutcome, LogKind,
};
use crate::source::LogSource;

/// Default number of trailing log lines per fetch.
pub const DEFAULT_TAIL_LINES: u32 = 50;

/// Default bound on a single log fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-invocation log fetch settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    pub tail_lines: u32,
    /// `None` waits as long as the log source does.
    pub fetch_timeout: Option<Duration>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            tail_lines: DEFAULT_TAIL_LINES,
            fetch_timeout: Some(DEFAULT_FETCH_TIMEOUT),
        }
    }
}

/// Fetch previous and current logs for every container, in parallel.
///
/// Returns one entry per container, in input order, after every worker has
/// finished.
pub async fn collect_logs(
    source: Arc<dyn LogSource>,
    namespace: &str,
    pod: &str,
    components: &[ClassifiedComponent],
    options: LogOptions,
    cancel: &CancellationToken,
) -> Vec<ComponentLogs> {
    let mut slots: Vec<Option<ComponentLogs>> = vec![None; components.len()];
    let mut slot_of_task = HashMap::with_capacity(components.len());
    let mut workers = JoinSet::new();

    for (slot, component) in components.iter().enumerate() {
        let worker = LogWorker {
            source: Arc::clone(&source),
            namespace: namespace.to_string(),
            pod: pod.to_string(),
            container: component.name.clone(),
            options,
            cancel: cancel.clone(),
        };
        let handle = workers.spawn(async move { (slot, worker.run().await) });
        slot_of_task.insert(handle.id(), slot);
    }

    while let Some(joined) = workers.join_next_with_id().await {
        match joined {
            Ok((_, (slot, logs))) => slots[slot] = Some(logs),
            Err(err) => {
                let Some(&slot) = slot_of_task.get(&err.id()) else {
                    continue;
                };
                let container = &components[slot].name;
                let failure = if err.is_cancelled() {
                    LogFetchFailure::Cancelled
                } else {
                    warn!(container = %container, error = %err, "Log worker panicked");
                    LogFetchFailure::WorkerFailed(err.to_string())
                };
                slots[slot] = Some(ComponentLogs::failed(container.as_str(), failure));
            }
        }
    }

    slots
        .into_iter()
        .zip(components)
        .map(|(slot, component)| {
            slot.unwrap_or_else(|| {
                ComponentLogs::failed(
                    component.name.as_str(),
                    LogFetchFailure::WorkerFailed("worker produced no result".to_string()),
                )
            })
        })
        .collect()
}

struct LogWorker {
    source: Arc<dyn LogSource>,
    namespace: String,
    pod: String,
    container: String,
    options: LogOptions,
    cancel: CancellationToken,
}

impl LogWorker {
    async fn run(self) -> ComponentLogs {
        let previous = self.fetch(LogKind::Previous).await;
        let current = self.fetch(LogKind::Current).await;
        ComponentLogs {
            component: self.container,
            previous,
            current,
        }
    }

    async fn fetch(&self, kind: LogKind) -> LogFetchOutcome {
        let request = self.source.fetch_log(
            &self.namespace,
            &self.pod,
            &self.container,
            kind,
            self.options.tail_lines,
        );

        let bounded = async {
            match self.options.fetch_timeout {
                Some(limit) => match tokio::time::timeout(limit, request).await {
                    Ok(result) => result.map_err(LogFetchFailure::from),
                    Err(_) => Err(LogFetchFailure::TimedOut {
                        millis: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    }),
                },
                None => request.await.map_err(LogFetchFailure::from),
            }
        };

        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(LogFetchFailure::Cancelled),
            result = bounded => result,
        };

        match result {
            Ok(body) => {
                debug!(container = %self.container, ?kind, bytes = body.len(), "Fetched log");
                LogFetchOutcome::Body(tail(body, self.options.tail_lines as usize))
            }
            Err(failure) => {
                if failure.is_expected_absence() {
                    debug!(container = %self.container, "No previous run to read logs from");
                } else {
                    warn!(container = %self.container, ?kind, %failure, "Log fetch failed");
                }
                LogFetchOutcome::Failed(failure)
            }
        }
    }
}

impl From<SourceError> for LogFetchFailure {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NoPreviousInstance => Self::NoPreviousInstance,
            SourceError::NotFound(msg) => Self::NotFound(msg),
            SourceError::Unavailable(msg) => Self::Unavailable(msg),
        }
    }
}

/// Keep only the last `limit` lines of `body`.
fn tail(body: String, limit: usize) -> String {
    let total = body.lines().count();
    if total <= limit {
        return body;
    }

    let mut kept = body.lines().skip(total - limit).collect::<Vec<_>>().join("\n");
    if body.ends_with('\n') {
        kept.push('\n');
    }
    kept
}
