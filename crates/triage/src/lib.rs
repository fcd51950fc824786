//! Fast triage for failed Kubernetes pods.
//!
//! Given a pod, this crate produces a prioritized snapshot of why it is
//! unhealthy: pod and container status, Warning/Error events, and the
//! previous-crash and current log tails of every failed container.
//!
//! # Pipeline
//!
//! - [`health::is_healthy`] short-circuits genuinely healthy pods
//! - [`classify::classify`] splits containers into failed and healthy
//! - [`events::relevant_events`] keeps Warning/Error events, newest first
//! - [`logs::collect_logs`] fetches log tails in parallel, one worker per container
//! - [`report::assemble`] merges everything into a [`TriageReport`]
//!
//! [`TriageEngine`] runs the pipeline against the [`InstanceSource`],
//! [`EventSource`] and [`LogSource`] traits; [`KubeSource`] implements them
//! against the Kubernetes API. [`render::Renderer`] turns the outcome into text.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use triage::{KubeSource, TriageEngine, TriageRequest};
//!
//! # async fn example() -> Result<(), triage::TriageError> {
//! let source = Arc::new(KubeSource::connect(None, None).await?);
//! let engine = TriageEngine::from_source(source);
//! let outcome = engine
//!     .run(&TriageRequest::new("my-pod", "default"), &CancellationToken::new())
//!     .await?;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod format;
pub mod health;
pub mod kube_source;
pub mod logs;
pub mod model;
pub mod render;
pub mod report;
pub mod source;

pub use classify::Classification;
pub use engine::{TriageEngine, TriageOutcome, TriageRequest};
pub use error::{SourceError, TriageError};
pub use kube_source::KubeSource;
pub use logs::LogOptions;
pub use report::TriageReport;
pub use source::{EventSource, InstanceSource, LogSource};
