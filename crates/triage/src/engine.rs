//! Triage pipeline.
//!
//! `Start -> health gate -> {Healthy | Unhealthy}`, then
//! `Unhealthy -> classify -> events + logs (concurrently) -> assemble`.
//! Any error returned from [`TriageEngine::run`] is fatal for the invocation;
//! per-container log failures live inside the report instead.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::classify::classify;
use crate::error::{SourceError, TriageError};
use crate::events::relevant_events;
use crate::health::is_healthy;
use crate::logs::{collect_logs, LogOptions};
use crate::report::{assemble, InstanceSummary, TriageReport};
use crate::source::{EventSource, InstanceSource, LogSource};

/// What to triage and how deep to look.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriageRequest {
    pub name: String,
    pub namespace: String,
    /// Show every container in full, not just failed ones.
    pub include_all: bool,
    /// Skip the health gate.
    pub force: bool,
    pub logs: LogOptions,
}

impl TriageRequest {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            include_all: false,
            force: false,
            logs: LogOptions::default(),
        }
    }
}

/// Terminal state of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TriageOutcome {
    /// The health gate passed; no deeper inspection was done.
    Healthy(InstanceSummary),
    /// A full report is ready for rendering.
    Report(TriageReport),
}

/// Runs the triage pipeline against injected cluster sources.
#[derive(Clone)]
pub struct TriageEngine {
    instances: Arc<dyn InstanceSource>,
    events: Arc<dyn EventSource>,
    logs: Arc<dyn LogSource>,
}

impl TriageEngine {
    pub fn new(
        instances: Arc<dyn InstanceSource>,
        events: Arc<dyn EventSource>,
        logs: Arc<dyn LogSource>,
    ) -> Self {
        Self {
            instances,
            events,
            logs,
        }
    }

    /// Build an engine whose three sources are one value.
    pub fn from_source<S>(source: Arc<S>) -> Self
    where
        S: InstanceSource + EventSource + LogSource + 'static,
    {
        Self {
            instances: source.clone(),
            events: source.clone(),
            logs: source,
        }
    }

    #[instrument(skip(self, cancel), fields(pod = %request.name, namespace = %request.namespace))]
    pub async fn run(
        &self,
        request: &TriageRequest,
        cancel: &CancellationToken,
    ) -> Result<TriageOutcome, TriageError> {
        let instance = self
            .instances
            .get_instance(&request.namespace, &request.name)
            .await
            .map_err(|source| match source {
                SourceError::NotFound(_) => TriageError::InstanceNotFound {
                    namespace: request.namespace.clone(),
                    name: request.name.clone(),
                },
                source => TriageError::InstanceFetch {
                    namespace: request.namespace.clone(),
                    name: request.name.clone(),
                    source,
                },
            })?;

        if !request.force && is_healthy(&instance) {
            info!("Pod is healthy, skipping triage");
            return Ok(TriageOutcome::Healthy(InstanceSummary::from_instance(
                &instance,
            )));
        }

        let classification = classify(&instance, request.include_all);
        debug!(
            shown = classification.failed.len(),
            healthy = classification.healthy.len(),
            "Classified containers"
        );

        // A failed event query stops in-flight log workers.
        let log_cancel = cancel.child_token();
        let events = async {
            let result =
                relevant_events(self.events.as_ref(), &request.namespace, &request.name).await;
            if result.is_err() {
                log_cancel.cancel();
            }
            result
        };
        let (events, logs) = tokio::join!(
            events,
            collect_logs(
                Arc::clone(&self.logs),
                &request.namespace,
                &request.name,
                &classification.failed,
                request.logs,
                &log_cancel,
            ),
        );
        let events = events?;

        info!(
            containers = classification.failed.len(),
            events = events.len(),
            "Triage report assembled"
        );
        Ok(TriageOutcome::Report(assemble(
            &instance,
            classification,
            events,
            logs,
        )))
    }
}
