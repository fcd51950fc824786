//! Container classification.
//!
//! Splits a pod's containers into the ones worth a full triage block and the
//! ones summarised as healthy. A restart is the strongest failure signal; the
//! current state reason adds to it through two separate taxonomies, one for
//! waiting containers and one for terminated containers.

use crate::model::{ClassifiedComponent, ComponentState, ComponentStatus, Instance};

/// Waiting reasons that mean the container cannot start or keeps crashing.
pub const WAITING_FAILURE_REASONS: &[&str] = &[
    "CrashLoopBackOff",
    "Error",
    "ImagePullBackOff",
    "ErrImagePull",
    "CreateContainerError",
    "InvalidImageName",
];

/// Terminated reasons that mean the last run ended badly.
pub const TERMINATED_FAILURE_REASONS: &[&str] =
    &["Error", "OOMKilled", "ContainerCannotRun", "DeadlineExceeded"];

/// Containers partitioned by the classifier, each in pod order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Containers that get a full triage block.
    pub failed: Vec<ClassifiedComponent>,
    /// Containers summarised on a single line.
    pub healthy: Vec<ClassifiedComponent>,
}

/// Classify a single container status.
pub fn classify_component(status: &ComponentStatus) -> ClassifiedComponent {
    let state_failed = match &status.state {
        ComponentState::Waiting { reason } => {
            matches_reason(reason.as_deref(), WAITING_FAILURE_REASONS)
        }
        ComponentState::Terminated { reason } => {
            matches_reason(reason.as_deref(), TERMINATED_FAILURE_REASONS)
        }
        ComponentState::Running => false,
    };

    ClassifiedComponent {
        name: status.name.clone(),
        state: status.state.label().to_string(),
        reason: status.state.reason().to_string(),
        restart_count: status.restart_count,
        failed: status.restart_count > 0 || state_failed,
        last_termination: status.last_termination.clone(),
    }
}

/// Partition every container of `instance` exactly once.
///
/// With `include_all`, every container is placed in `failed` so it gets a
/// full block; the `failed` flag on each entry still carries the real verdict.
pub fn classify(instance: &Instance, include_all: bool) -> Classification {
    let mut classification = Classification::default();

    for status in &instance.components {
        let component = classify_component(status);
        if component.failed || include_all {
            classification.failed.push(component);
        } else {
            classification.healthy.push(component);
        }
    }

    classification
}

fn matches_reason(reason: Option<&str>, known: &[&str]) -> bool {
    reason.is_some_and(|r| known.iter().any(|k| *k == r))
}
