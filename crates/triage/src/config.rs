//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::engine::TriageRequest;
use crate::logs::{LogOptions, DEFAULT_TAIL_LINES};

/// Namespace used when neither the flag nor the kubeconfig context sets one.
pub const FALLBACK_NAMESPACE: &str = "default";

/// Fast triage for failed Kubernetes pods
#[derive(Debug, Clone, Parser)]
#[command(name = "kubectl-triage")]
#[command(about = "Fast triage for failed Kubernetes pods")]
#[command(
    long_about = "kubectl-triage provides a 5-second diagnostic snapshot for failed Kubernetes pods.

It aggregates:
  - Pod status and container states
  - Critical events (Warning/Error only - filters out noise)
  - Previous crash logs (if container restarted)
  - Current container logs

Only failed/restarted containers are shown by default, keeping output focused."
)]
#[command(after_help = "Examples:
  kubectl triage my-failing-pod
  kubectl triage my-pod -n production
  kubectl triage my-pod --all-containers
  kubectl triage my-pod --force
  kubectl triage my-pod --lines=100")]
#[command(version)]
pub struct TriageArgs {
    /// Pod to triage
    #[arg(value_name = "POD")]
    pub pod: String,

    /// Namespace of the pod (defaults to the kubeconfig context namespace)
    #[arg(short, long, env = "KUBECTL_TRIAGE_NAMESPACE")]
    pub namespace: Option<String>,

    /// Kubeconfig context to use
    #[arg(long, env = "KUBECTL_TRIAGE_CONTEXT")]
    pub context: Option<String>,

    /// Path to the kubeconfig file
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Number of log lines to display
    #[arg(
        long,
        env = "KUBECTL_TRIAGE_LINES",
        default_value_t = DEFAULT_TAIL_LINES,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub lines: u32,

    /// Show all containers, not just failed/restarted ones
    #[arg(long, env = "KUBECTL_TRIAGE_ALL_CONTAINERS")]
    pub all_containers: bool,

    /// Inspect pod even if it appears healthy
    #[arg(long, env = "KUBECTL_TRIAGE_FORCE")]
    pub force: bool,

    /// Disable colored output
    #[arg(long, env = "KUBECTL_TRIAGE_NO_COLOR")]
    pub no_color: bool,

    /// Seconds to wait for each log fetch (0 waits indefinitely)
    #[arg(long, env = "KUBECTL_TRIAGE_LOG_TIMEOUT", default_value = "30")]
    pub log_timeout: u64,

    /// Output format: text, json
    #[arg(short, long, default_value = "text")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl TriageArgs {
    /// Namespace to use: explicit flag first, then the context default.
    pub fn resolve_namespace(&self, context_namespace: Option<&str>) -> String {
        self.namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .or(context_namespace.filter(|ns| !ns.is_empty()))
            .unwrap_or(FALLBACK_NAMESPACE)
            .to_string()
    }

    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            tail_lines: self.lines,
            fetch_timeout: (self.log_timeout > 0).then(|| Duration::from_secs(self.log_timeout)),
        }
    }

    /// Engine request for this invocation. Rendering flags are not included.
    pub fn to_request(&self, namespace: String) -> TriageRequest {
        TriageRequest {
            name: self.pod.clone(),
            namespace,
            include_all: self.all_containers,
            force: self.force,
            logs: self.log_options(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = TriageArgs::try_parse_from(["kubectl-triage", "web-0"]).unwrap();
        assert_eq!(args.pod, "web-0");
        assert_eq!(args.lines, 50);
        assert!(!args.all_containers);
        assert!(!args.force);
        assert!(!args.no_color);
        assert_eq!(args.output, OutputFormat::Text);
        assert_eq!(
            args.log_options().fetch_timeout,
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_flags() {
        let args = TriageArgs::try_parse_from([
            "kubectl-triage",
            "web-0",
            "-n",
            "prod",
            "--lines=100",
            "--all-containers",
            "--force",
            "--no-color",
            "--log-timeout",
            "0",
            "-o",
            "json",
        ])
        .unwrap();

        let request = args.to_request(args.resolve_namespace(Some("ctx")));
        assert_eq!(request.namespace, "prod");
        assert_eq!(request.logs.tail_lines, 100);
        assert_eq!(request.logs.fetch_timeout, None);
        assert!(request.include_all);
        assert!(request.force);
        assert_eq!(args.output, OutputFormat::Json);
    }

    #[test]
    fn test_pod_is_required() {
        assert!(TriageArgs::try_parse_from(["kubectl-triage"]).is_err());
    }

    #[test]
    fn test_zero_lines_rejected() {
        assert!(TriageArgs::try_parse_from(["kubectl-triage", "web-0", "--lines", "0"]).is_err());
    }

    #[test]
    fn test_namespace_resolution_order() {
        let args = TriageArgs::try_parse_from(["kubectl-triage", "web-0"]).unwrap();
        assert_eq!(args.resolve_namespace(Some("team-a")), "team-a");
        assert_eq!(args.resolve_namespace(Some("")), "default");
        assert_eq!(args.resolve_namespace(None), "default");
    }
}
