//! Error types for triage.

use thiserror::Error;

/// Errors returned by the instance, event and log sources.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The requested object does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The container has no previous run to read logs from
    #[error("no previous terminated container")]
    NoPreviousInstance,

    /// The cluster API could not be reached or rejected the request
    #[error("{0}")]
    Unavailable(String),
}

/// Fatal errors that abort a triage invocation.
#[derive(Debug, Error)]
pub enum TriageError {
    #[error("pod {name} not found in namespace {namespace}")]
    InstanceNotFound { namespace: String, name: String },

    #[error("failed to get pod {name} in namespace {namespace}")]
    InstanceFetch {
        namespace: String,
        name: String,
        #[source]
        source: SourceError,
    },

    #[error("failed to get events")]
    EventQuery {
        #[source]
        source: SourceError,
    },

    #[error("failed to build Kubernetes client: {0}")]
    ClientConfig(String),
}
