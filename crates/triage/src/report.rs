//! Triage report assembly.
//!
//! The report is the only thing handed to the renderer. It is built by a pure
//! function from the classifier, event and log outputs.

use serde::Serialize;
use std::fmt;

use crate::classify::Classification;
use crate::model::{
    ClassifiedComponent, ComponentLogs, DiagnosticEvent, Instance, LogFetchFailure, Phase,
};

/// Number of most recent events emphasised when rendering.
pub const PRIMARY_EVENT_LIMIT: usize = 10;

/// Pod-level facts shown in every status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceSummary {
    pub name: String,
    pub namespace: String,
    pub phase: Phase,
    /// Ready containers over total, e.g. `1/2`.
    pub ready: String,
}

impl InstanceSummary {
    pub fn from_instance(instance: &Instance) -> Self {
        Self {
            name: instance.name.clone(),
            namespace: instance.namespace.clone(),
            phase: instance.phase,
            ready: instance.ready_count(),
        }
    }
}

/// A container shown in full, with its logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentTriage {
    pub component: ClassifiedComponent,
    pub logs: ComponentLogs,
}

/// Compact `(name, state, restarts)` entry for a healthy container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthyEntry {
    pub name: String,
    pub state: String,
    pub restart_count: u32,
}

impl fmt::Display for HealthyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} restarts)",
            self.name, self.state, self.restart_count
        )
    }
}

/// Containers that passed classification, summarised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthySummary {
    pub count: usize,
    pub entries: Vec<HealthyEntry>,
}

/// Assembled triage output for one pod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriageReport {
    pub instance: InstanceSummary,
    /// Containers shown in full, in pod order.
    pub components: Vec<ComponentTriage>,
    /// All Warning/Error events, most recent first.
    pub events: Vec<DiagnosticEvent>,
    /// How many leading entries of `events` are emphasised.
    pub primary_event_count: usize,
    pub healthy: HealthySummary,
}

impl TriageReport {
    /// The most recent events, at most [`PRIMARY_EVENT_LIMIT`].
    pub fn primary_events(&self) -> &[DiagnosticEvent] {
        &self.events[..self.primary_event_count.min(self.events.len())]
    }
}

/// Combine classification, events and logs into a report.
///
/// `logs` is matched to containers by name, so it need not be in the same
/// order as `classification.failed`. A shown container with no log entry gets
/// a worker failure for both kinds.
pub fn assemble(
    instance: &Instance,
    classification: Classification,
    events: Vec<DiagnosticEvent>,
    mut logs: Vec<ComponentLogs>,
) -> TriageReport {
    let components = classification
        .failed
        .into_iter()
        .map(|component| {
            let logs = match logs.iter().position(|l| l.component == component.name) {
                Some(idx) => logs.swap_remove(idx),
                None => ComponentLogs::failed(
                    component.name.as_str(),
                    LogFetchFailure::WorkerFailed("logs not collected".to_string()),
                ),
            };
            ComponentTriage { component, logs }
        })
        .collect();

    let entries: Vec<HealthyEntry> = classification
        .healthy
        .into_iter()
        .map(|c| HealthyEntry {
            name: c.name,
            state: c.state,
            restart_count: c.restart_count,
        })
        .collect();

    TriageReport {
        instance: InstanceSummary::from_instance(instance),
        components,
        primary_event_count: events.len().min(PRIMARY_EVENT_LIMIT),
        events,
        healthy: HealthySummary {
            count: entries.len(),
            entries,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventSeverity, LogFetchOutcome};

    fn component(name: &str, failed: bool) -> ClassifiedComponent {
        ClassifiedComponent {
            name: name.to_string(),
            state: if failed { "Waiting" } else { "Running" }.to_string(),
            reason: String::new(),
            restart_count: u32::from(failed),
            failed,
            last_termination: None,
        }
    }

    fn logs(name: &str) -> ComponentLogs {
        ComponentLogs {
            component: name.to_string(),
            previous: LogFetchOutcome::Body(format!("{name} previous")),
            current: LogFetchOutcome::Body(format!("{name} current")),
        }
    }

    fn event(reason: &str) -> DiagnosticEvent {
        DiagnosticEvent {
            severity: EventSeverity::Warning,
            reason: reason.to_string(),
            message: String::new(),
            timestamp: None,
        }
    }

    #[test]
    fn test_logs_are_paired_by_name() {
        let classification = Classification {
            failed: vec![component("a", true), component("b", true)],
            healthy: vec![],
        };
        let report = assemble(
            &Instance::default(),
            classification,
            vec![],
            vec![logs("b"), logs("a")],
        );

        assert_eq!(report.components[0].component.name, "a");
        assert_eq!(report.components[0].logs.component, "a");
        assert_eq!(report.components[1].logs.component, "b");
    }

    #[test]
    fn test_missing_logs_become_failures() {
        let classification = Classification {
            failed: vec![component("a", true)],
            healthy: vec![],
        };
        let report = assemble(&Instance::default(), classification, vec![], vec![]);
        assert!(report.components[0].logs.current.failure().is_some());
    }

    #[test]
    fn test_primary_events_capped_at_ten() {
        let events: Vec<_> = (0..15).map(|i| event(&format!("e{i}"))).collect();
        let report = assemble(
            &Instance::default(),
            Classification::default(),
            events,
            vec![],
        );

        assert_eq!(report.events.len(), 15);
        assert_eq!(report.primary_event_count, 10);
        assert_eq!(report.primary_events().len(), 10);
        assert_eq!(report.primary_events()[0].reason, "e0");

        let report = assemble(
            &Instance::default(),
            Classification::default(),
            vec![event("only")],
            vec![],
        );
        assert_eq!(report.primary_events().len(), 1);
    }

    #[test]
    fn test_primary_events_bounded_by_event_list() {
        let mut report = assemble(
            &Instance::default(),
            Classification::default(),
            vec![event("a"), event("b")],
            vec![],
        );
        report.primary_event_count = PRIMARY_EVENT_LIMIT;

        assert_eq!(report.primary_events().len(), 2);
    }

    #[test]
    fn test_healthy_summary() {
        let classification = Classification {
            failed: vec![component("app", true)],
            healthy: vec![component("sidecar", false)],
        };
        let report = assemble(
            &Instance::default(),
            classification,
            vec![],
            vec![logs("app")],
        );

        assert_eq!(report.healthy.count, 1);
        assert_eq!(
            report.healthy.entries[0].to_string(),
            "sidecar (Running, 0 restarts)"
        );
    }
}
