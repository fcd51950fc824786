//! Collaborator traits the engine reads the cluster through.
//!
//! The engine only ever reads. [`crate::kube_source::KubeSource`] implements
//! all three against the Kubernetes API; tests substitute fakes.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::model::{Instance, LogKind, RawEvent};

/// Fetches the pod snapshot.
#[async_trait]
pub trait InstanceSource: Send + Sync {
    async fn get_instance(&self, namespace: &str, name: &str) -> Result<Instance, SourceError>;
}

/// Lists events whose involved object is the named pod.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn list_events(&self, namespace: &str, name: &str)
        -> Result<Vec<RawEvent>, SourceError>;
}

/// Reads the tail of one container's log.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Returns [`SourceError::NoPreviousInstance`] when `kind` is
    /// [`LogKind::Previous`] and the container never restarted.
    async fn fetch_log(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        kind: LogKind,
        tail_lines: u32,
    ) -> Result<String, SourceError>;
}
