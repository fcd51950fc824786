//! Snapshot types the triage engine reads and produces.
//!
//! These are simplified, cluster-agnostic views of a pod and its containers.
//! The kube adapter converts API objects into them once per invocation; the
//! engine never mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Pod lifecycle phase from `status.phase`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Pending,
    Running,
    Succeeded,
    Failed,
    #[default]
    Unknown,
}

impl Phase {
    /// Parse the API string; anything unrecognised maps to `Unknown`.
    #[must_use]
    pub fn parse(phase: &str) -> Self {
        match phase {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tri-state condition status: "True", "False", "Unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

impl ConditionStatus {
    #[must_use]
    pub fn parse(status: &str) -> Self {
        match status {
            "True" => Self::True,
            "False" => Self::False,
            _ => Self::Unknown,
        }
    }
}

/// Pod condition from `status.conditions[]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Condition type: "Ready", "ContainersReady", "Initialized", etc.
    pub condition_type: String,
    pub status: ConditionStatus,
}

/// Condition type consulted by the health gate.
pub const READY_CONDITION: &str = "Ready";

/// Current container state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentState {
    Running,
    Waiting { reason: Option<String> },
    Terminated { reason: Option<String> },
}

impl Default for ComponentState {
    fn default() -> Self {
        Self::Waiting { reason: None }
    }
}

impl ComponentState {
    /// Display label: "Running", "Waiting" or "Terminated".
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Waiting { .. } => "Waiting",
            Self::Terminated { .. } => "Terminated",
        }
    }

    /// Reason attached to the state, empty for running containers.
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::Running => "",
            Self::Waiting { reason } | Self::Terminated { reason } => {
                reason.as_deref().unwrap_or_default()
            }
        }
    }
}

/// How the previous run of a container ended, from `lastState.terminated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastTermination {
    pub reason: Option<String>,
    pub exit_code: i32,
}

/// Observed state of one container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub name: String,
    pub restart_count: u32,
    pub state: ComponentState,
    pub ready: bool,
    pub last_termination: Option<LastTermination>,
}

/// Simplified pod snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub namespace: String,
    pub phase: Phase,
    pub components: Vec<ComponentStatus>,
    pub conditions: Vec<Condition>,
}

impl Instance {
    /// Ready containers over total, e.g. `1/2`.
    #[must_use]
    pub fn ready_count(&self) -> String {
        let ready = self.components.iter().filter(|c| c.ready).count();
        format!("{ready}/{}", self.components.len())
    }
}

/// Classifier output for one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedComponent {
    pub name: String,
    pub state: String,
    pub reason: String,
    pub restart_count: u32,
    /// True failure signal, independent of whether `--all-containers` placed it.
    pub failed: bool,
    pub last_termination: Option<LastTermination>,
}

/// Event severity classes that survive filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSeverity {
    Warning,
    Error,
}

impl EventSeverity {
    /// Parse an event `type`; `Normal` and anything else yields `None`.
    #[must_use]
    pub fn parse(event_type: &str) -> Option<Self> {
        match event_type {
            "Warning" => Some(Self::Warning),
            "Error" => Some(Self::Error),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

/// Event as returned by the event source, before filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    pub event_type: String,
    pub reason: String,
    pub message: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Actionable event attached to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticEvent {
    pub severity: EventSeverity,
    pub reason: String,
    pub message: String,
    /// `None` when the API reported no timestamp at all; sorts as oldest.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Which run of a container a log fetch targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Previous,
    Current,
}

impl LogKind {
    #[must_use]
    pub const fn is_previous(self) -> bool {
        matches!(self, Self::Previous)
    }
}

/// Why a single log fetch produced no body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum LogFetchFailure {
    /// The container never restarted, so there is no previous run. Expected.
    NoPreviousInstance,
    NotFound(String),
    Unavailable(String),
    TimedOut { millis: u64 },
    Cancelled,
    WorkerFailed(String),
}

impl LogFetchFailure {
    /// Absence that must not be reported as an error.
    #[must_use]
    pub const fn is_expected_absence(&self) -> bool {
        matches!(self, Self::NoPreviousInstance)
    }
}

impl fmt::Display for LogFetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPreviousInstance => f.write_str("no previous terminated container"),
            Self::NotFound(msg) | Self::Unavailable(msg) => f.write_str(msg),
            Self::TimedOut { millis } => {
                write!(f, "timed out after {:?}", Duration::from_millis(*millis))
            }
            Self::Cancelled => f.write_str("cancelled"),
            Self::WorkerFailed(msg) => write!(f, "log worker failed: {msg}"),
        }
    }
}

/// Result of one log fetch: a body or a failure, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFetchOutcome {
    Body(String),
    Failed(LogFetchFailure),
}

impl LogFetchOutcome {
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Body(body) => Some(body),
            Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub const fn failure(&self) -> Option<&LogFetchFailure> {
        match self {
            Self::Body(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }
}

/// Previous and current log outcomes for one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentLogs {
    pub component: String,
    pub previous: LogFetchOutcome,
    pub current: LogFetchOutcome,
}

impl ComponentLogs {
    /// Both fetches failed with the same reason (cancellation, worker panic).
    #[must_use]
    pub fn failed(component: impl Into<String>, failure: LogFetchFailure) -> Self {
        Self {
            component: component.into(),
            previous: LogFetchOutcome::Failed(failure.clone()),
            current: LogFetchOutcome::Failed(failure),
        }
    }
}
