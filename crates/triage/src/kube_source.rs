//! Kubernetes-backed instance, event and log sources.

use std::path::Path;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{
    ContainerState as K8sContainerState, ContainerStatus as K8sContainerStatus, Event, Pod,
};
use kube::api::{Api, ListParams, LogParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::{debug, instrument};

use crate::error::{SourceError, TriageError};
use crate::model::{
    ComponentState, ComponentStatus, Condition, ConditionStatus, Instance, LastTermination,
    LogKind, Phase, RawEvent,
};
use crate::source::{EventSource, InstanceSource, LogSource};

/// Substring of the API error returned when asking for logs of a previous
/// run that does not exist.
const NO_PREVIOUS_MARKER: &str = "previous terminated container";

/// Reads pods, events and logs through the Kubernetes API.
#[derive(Clone)]
pub struct KubeSource {
    client: Client,
}

impl KubeSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from an explicit kubeconfig and/or context, falling back
    /// to in-cluster or default kubeconfig inference.
    pub async fn connect(
        kubeconfig: Option<&Path>,
        context: Option<&str>,
    ) -> Result<Self, TriageError> {
        let options = KubeConfigOptions {
            context: context.map(str::to_string),
            ..KubeConfigOptions::default()
        };

        let config = match kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                    TriageError::ClientConfig(format!(
                        "failed to read kubeconfig {}: {e}",
                        path.display()
                    ))
                })?;
                Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(|e| TriageError::ClientConfig(e.to_string()))?
            }
            None if context.is_some() => Config::from_kubeconfig(&options)
                .await
                .map_err(|e| TriageError::ClientConfig(e.to_string()))?,
            None => Config::infer()
                .await
                .map_err(|e| TriageError::ClientConfig(e.to_string()))?,
        };

        let client =
            Client::try_from(config).map_err(|e| TriageError::ClientConfig(e.to_string()))?;
        Ok(Self::new(client))
    }

    /// Namespace of the active kubeconfig context, or `default`.
    pub fn default_namespace(&self) -> &str {
        self.client.default_namespace()
    }
}

#[async_trait]
impl InstanceSource for KubeSource {
    #[instrument(skip(self))]
    async fn get_instance(&self, namespace: &str, name: &str) -> Result<Instance, SourceError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pod = pods.get(name).await.map_err(source_error)?;
        Ok(instance_from_pod(pod))
    }
}

#[async_trait]
impl EventSource for KubeSource {
    #[instrument(skip(self))]
    async fn list_events(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Vec<RawEvent>, SourceError> {
        let events: Api<Event> = Api::namespaced(self.client.clone(), namespace);
        let params = ListParams::default().fields(&format!("involvedObject.name={name}"));
        let list = events.list(&params).await.map_err(source_error)?;
        debug!(count = list.items.len(), "Listed pod events");
        Ok(list.items.into_iter().map(raw_event).collect())
    }
}

#[async_trait]
impl LogSource for KubeSource {
    async fn fetch_log(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        kind: LogKind,
        tail_lines: u32,
    ) -> Result<String, SourceError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = LogParams {
            container: Some(container.to_string()),
            previous: kind.is_previous(),
            tail_lines: Some(i64::from(tail_lines)),
            ..LogParams::default()
        };
        pods.logs(pod, &params).await.map_err(source_error)
    }
}

fn source_error(err: kube::Error) -> SourceError {
    match err {
        kube::Error::Api(resp) if resp.code == 404 => SourceError::NotFound(resp.message),
        kube::Error::Api(resp) if resp.code == 400 && resp.message.contains(NO_PREVIOUS_MARKER) => {
            SourceError::NoPreviousInstance
        }
        kube::Error::Api(resp) => SourceError::Unavailable(resp.message),
        other => SourceError::Unavailable(other.to_string()),
    }
}

/// Convert an API pod into the engine's snapshot.
pub fn instance_from_pod(pod: Pod) -> Instance {
    let status = pod.status.unwrap_or_default();

    Instance {
        name: pod.metadata.name.unwrap_or_default(),
        namespace: pod.metadata.namespace.unwrap_or_default(),
        phase: status.phase.as_deref().map_or(Phase::Unknown, Phase::parse),
        components: status
            .container_statuses
            .unwrap_or_default()
            .into_iter()
            .map(component_from_status)
            .collect(),
        conditions: status
            .conditions
            .unwrap_or_default()
            .into_iter()
            .map(|c| Condition {
                condition_type: c.type_,
                status: ConditionStatus::parse(&c.status),
            })
            .collect(),
    }
}

fn component_from_status(cs: K8sContainerStatus) -> ComponentStatus {
    let last_termination = cs
        .last_state
        .and_then(|s| s.terminated)
        .map(|t| LastTermination {
            reason: t.reason,
            exit_code: t.exit_code,
        });

    ComponentStatus {
        name: cs.name,
        restart_count: u32::try_from(cs.restart_count).unwrap_or(0),
        state: cs.state.map(component_state).unwrap_or_default(),
        ready: cs.ready,
        last_termination,
    }
}

fn component_state(state: K8sContainerState) -> ComponentState {
    if let Some(waiting) = state.waiting {
        ComponentState::Waiting {
            reason: waiting.reason,
        }
    } else if let Some(terminated) = state.terminated {
        ComponentState::Terminated {
            reason: terminated.reason,
        }
    } else if state.running.is_some() {
        ComponentState::Running
    } else {
        ComponentState::default()
    }
}

/// Convert an API event, picking the most specific timestamp available.
pub fn raw_event(event: Event) -> RawEvent {
    let timestamp = event
        .last_timestamp
        .map(|t| t.0)
        .or_else(|| event.event_time.map(|t| t.0))
        .or_else(|| event.first_timestamp.map(|t| t.0))
        .or_else(|| event.metadata.creation_timestamp.map(|t| t.0));

    RawEvent {
        event_type: event.type_.unwrap_or_default(),
        reason: event.reason.unwrap_or_default(),
        message: event.message.unwrap_or_default(),
        timestamp,
    }
}
