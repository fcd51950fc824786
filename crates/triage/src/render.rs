//! Terminal rendering for triage outcomes.
//!
//! Rendering is kept out of the engine: the engine returns a value and this
//! module writes it to any [`Write`] sink.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::engine::TriageOutcome;
use crate::format::format_age;
use crate::model::{DiagnosticEvent, EventSeverity, LogFetchOutcome, LogKind};
use crate::report::{ComponentTriage, InstanceSummary, TriageReport};

const BANNER_WIDTH: usize = 80;

/// Substrings that mark a log line worth highlighting.
const LOG_KEYWORDS: &[&str] = &[
    "ERROR",
    "error",
    "Error",
    "panic",
    "PANIC",
    "Panic",
    "fatal",
    "FATAL",
    "Fatal",
    "exception",
    "Exception",
    "EXCEPTION",
    "failed",
    "Failed",
    "FAILED",
    "killed",
    "Killed",
    "KILLED",
    "OOMKilled",
];

/// Writes a [`TriageOutcome`] as human-readable text.
#[derive(Debug, Clone)]
pub struct Renderer {
    /// Emphasise error events and highlight log keywords.
    pub highlight: bool,
    /// Number of tail lines requested, shown in log headers.
    pub tail_lines: u32,
    /// Reference point for event ages.
    pub now: DateTime<Utc>,
}

impl Renderer {
    pub fn new(highlight: bool, tail_lines: u32) -> Self {
        Self {
            highlight,
            tail_lines,
            now: Utc::now(),
        }
    }

    pub fn render(&self, outcome: &TriageOutcome, out: &mut impl Write) -> io::Result<()> {
        match outcome {
            TriageOutcome::Healthy(summary) => self.render_healthy(summary, out),
            TriageOutcome::Report(report) => self.render_report(report, out),
        }
    }

    fn render_healthy(&self, summary: &InstanceSummary, out: &mut impl Write) -> io::Result<()> {
        let line = format!(
            "✅ Pod '{}' is healthy (Ready {}, 0 restarts).",
            summary.name, summary.ready
        );
        writeln!(out, "{}", line.green())?;
        writeln!(out, "Use --force to inspect anyway.")
    }

    fn render_report(&self, report: &TriageReport, out: &mut impl Write) -> io::Result<()> {
        if report.components.is_empty() {
            self.banner(
                &format!(
                    "🔍 TRIAGE FOR POD: '{}' (Phase: {})",
                    report.instance.name, report.instance.phase
                ),
                false,
                out,
            )?;
            writeln!(out, "📋 POD STATUS")?;
            writeln!(
                out,
                "  Phase: {} | Ready: {}",
                report.instance.phase, report.instance.ready
            )?;
            writeln!(out)?;
            self.render_events(report, out)?;
        }

        for (idx, entry) in report.components.iter().enumerate() {
            self.render_component(report, entry, idx == 0, out)?;
        }

        if report.healthy.count > 0 {
            writeln!(out, "{}", "-".repeat(BANNER_WIDTH))?;
            let names: Vec<String> = report
                .healthy
                .entries
                .iter()
                .map(ToString::to_string)
                .collect();
            writeln!(
                out,
                "ℹ️  {} other container(s) running normally: [{}]",
                report.healthy.count,
                names.join(", ")
            )?;
            writeln!(out)?;
        }
        Ok(())
    }

    fn render_component(
        &self,
        report: &TriageReport,
        entry: &ComponentTriage,
        first: bool,
        out: &mut impl Write,
    ) -> io::Result<()> {
        let component = &entry.component;
        if component.failed {
            self.banner(
                &format!(
                    "🚨 TRIAGE FOR FAILED CONTAINER: '{}' (Reason: {})",
                    component.name, component.reason
                ),
                true,
                out,
            )?;
        } else {
            self.banner(
                &format!("🔍 TRIAGE FOR CONTAINER: '{}'", component.name),
                false,
                out,
            )?;
        }

        writeln!(out, "📋 POD STATUS")?;
        let mut status = format!(
            "  Phase: {} | Restarts: {} | Ready: {}",
            report.instance.phase, component.restart_count, report.instance.ready
        );
        if let Some(last) = &component.last_termination {
            status.push_str(&format!(
                " | Last exit: {} (code {})",
                last.reason.as_deref().unwrap_or("Unknown"),
                last.exit_code
            ));
        }
        writeln!(out, "{status}")?;
        writeln!(out)?;

        // Events belong to the pod, so they are printed once.
        if first {
            self.render_events(report, out)?;
        }

        self.render_log(LogKind::Previous, &entry.logs.previous, out)?;
        self.render_log(LogKind::Current, &entry.logs.current, out)
    }

    fn render_events(&self, report: &TriageReport, out: &mut impl Write) -> io::Result<()> {
        let events = report.primary_events();
        if events.is_empty() {
            return Ok(());
        }

        writeln!(
            out,
            "⚠️  CRITICAL EVENTS (Warning/Error only - Last {})",
            events.len()
        )?;
        for event in events {
            let line = format!(
                "  {} ago | {:<7} | {:<15} | {}",
                format_age(event.timestamp, self.now),
                event.severity.as_str(),
                event.reason,
                event.message
            );
            if self.highlight && is_severe(event) {
                writeln!(out, "{}", line.red())?;
            } else {
                writeln!(out, "{line}")?;
            }
        }
        writeln!(out)
    }

    fn render_log(
        &self,
        kind: LogKind,
        outcome: &LogFetchOutcome,
        out: &mut impl Write,
    ) -> io::Result<()> {
        let (title, label) = if kind.is_previous() {
            ("🔥 PREVIOUS LOGS", "previous")
        } else {
            ("🔄 CURRENT LOGS", "current")
        };

        match outcome {
            LogFetchOutcome::Body(body) if body.trim().is_empty() => Ok(()),
            LogFetchOutcome::Body(body) => {
                if kind.is_previous() {
                    writeln!(
                        out,
                        "{title} (Last Crash) - Last {} lines",
                        self.tail_lines
                    )?;
                } else {
                    writeln!(out, "{title} - Last {} lines", self.tail_lines)?;
                }
                writeln!(out, "{}", "-".repeat(BANNER_WIDTH))?;
                self.render_log_lines(body, out)?;
                writeln!(out, "{}", "-".repeat(BANNER_WIDTH))?;
                writeln!(out)
            }
            LogFetchOutcome::Failed(failure) if failure.is_expected_absence() => Ok(()),
            LogFetchOutcome::Failed(failure) => {
                writeln!(out, "{title}")?;
                writeln!(out, "  (No {label} logs: {failure})")?;
                writeln!(out)
            }
        }
    }

    fn render_log_lines(&self, body: &str, out: &mut impl Write) -> io::Result<()> {
        for line in body.lines().filter(|l| !l.is_empty()) {
            if self.highlight && has_keyword(line) {
                writeln!(out, "{}", format!("  {line}").red())?;
            } else {
                writeln!(out, "  {line}")?;
            }
        }
        Ok(())
    }

    fn banner(&self, title: &str, failed: bool, out: &mut impl Write) -> io::Result<()> {
        let rule = "=".repeat(BANNER_WIDTH);
        writeln!(out)?;
        writeln!(out, "{rule}")?;
        if failed && self.highlight {
            writeln!(out, "{}", title.red().bold())?;
        } else {
            writeln!(out, "{}", title.bold())?;
        }
        writeln!(out, "{rule}")?;
        writeln!(out)
    }
}

fn is_severe(event: &DiagnosticEvent) -> bool {
    event.severity == EventSeverity::Error || event.reason.contains("Failed")
}

fn has_keyword(line: &str) -> bool {
    LOG_KEYWORDS.iter().any(|k| line.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ClassifiedComponent, ComponentLogs, LastTermination, LogFetchFailure, Phase,
    };
    use crate::report::{HealthyEntry, HealthySummary};

    fn render(outcome: &TriageOutcome) -> String {
        colored::control::set_override(false);
        let renderer = Renderer::new(false, 50);
        let mut buf = Vec::new();
        renderer.render(outcome, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn summary() -> InstanceSummary {
        InstanceSummary {
            name: "web-0".to_string(),
            namespace: "default".to_string(),
            phase: Phase::Running,
            ready: "1/2".to_string(),
        }
    }

    fn app(previous: LogFetchOutcome, current: LogFetchOutcome) -> ComponentTriage {
        ComponentTriage {
            component: ClassifiedComponent {
                name: "app".to_string(),
                state: "Waiting".to_string(),
                reason: "CrashLoopBackOff".to_string(),
                restart_count: 5,
                failed: true,
                last_termination: Some(LastTermination {
                    reason: Some("OOMKilled".to_string()),
                    exit_code: 137,
                }),
            },
            logs: ComponentLogs {
                component: "app".to_string(),
                previous,
                current,
            },
        }
    }

    fn report(components: Vec<ComponentTriage>) -> TriageReport {
        TriageReport {
            instance: summary(),
            components,
            events: vec![DiagnosticEvent {
                severity: EventSeverity::Warning,
                reason: "BackOff".to_string(),
                message: "Back-off restarting failed container".to_string(),
                timestamp: None,
            }],
            primary_event_count: 1,
            healthy: HealthySummary {
                count: 1,
                entries: vec![HealthyEntry {
                    name: "sidecar".to_string(),
                    state: "Running".to_string(),
                    restart_count: 0,
                }],
            },
        }
    }

    #[test]
    fn test_healthy_message() {
        let text = render(&TriageOutcome::Healthy(summary()));
        assert!(text.contains("Pod 'web-0' is healthy (Ready 1/2, 0 restarts)."));
        assert!(text.contains("Use --force to inspect anyway."));
    }

    #[test]
    fn test_failed_container_block() {
        let text = render(&TriageOutcome::Report(report(vec![app(
            LogFetchOutcome::Body("boom\n\npanic: nil map\n".to_string()),
            LogFetchOutcome::Body("starting\n".to_string()),
        )])));

        assert!(text.contains("TRIAGE FOR FAILED CONTAINER: 'app' (Reason: CrashLoopBackOff)"));
        assert!(text.contains("Phase: Running | Restarts: 5 | Ready: 1/2"));
        assert!(text.contains("Last exit: OOMKilled (code 137)"));
        assert!(text.contains("CRITICAL EVENTS"));
        assert!(text.contains("BackOff"));
        assert!(text.contains("PREVIOUS LOGS (Last Crash) - Last 50 lines"));
        assert!(text.contains("  panic: nil map"));
        assert!(text.contains("CURRENT LOGS - Last 50 lines"));
        assert!(text.contains("1 other container(s) running normally: [sidecar (Running, 0 restarts)]"));
    }

    #[test]
    fn test_expected_absence_renders_nothing() {
        let text = render(&TriageOutcome::Report(report(vec![app(
            LogFetchOutcome::Failed(LogFetchFailure::NoPreviousInstance),
            LogFetchOutcome::Failed(LogFetchFailure::Unavailable("container not ready".to_string())),
        )])));

        assert!(!text.contains("PREVIOUS LOGS"));
        assert!(text.contains("(No current logs: container not ready)"));
    }

    #[test]
    fn test_events_printed_once() {
        let second = ComponentTriage {
            component: ClassifiedComponent {
                name: "worker".to_string(),
                ..app(LogFetchOutcome::Body(String::new()), LogFetchOutcome::Body(String::new()))
                    .component
            },
            logs: ComponentLogs::failed("worker", LogFetchFailure::Cancelled),
        };
        let text = render(&TriageOutcome::Report(report(vec![
            app(LogFetchOutcome::Body(String::new()), LogFetchOutcome::Body(String::new())),
            second,
        ])));

        assert_eq!(text.matches("CRITICAL EVENTS").count(), 1);
        assert!(text.contains("(No previous logs: cancelled)"));
    }

    #[test]
    fn test_pod_section_when_no_container_shown() {
        let text = render(&TriageOutcome::Report(report(vec![])));
        assert!(text.contains("TRIAGE FOR POD: 'web-0' (Phase: Running)"));
        assert!(text.contains("CRITICAL EVENTS"));
    }

    #[test]
    fn test_keyword_detection() {
        assert!(has_keyword("java.lang.NullPointerException"));
        assert!(has_keyword("process OOMKilled"));
        assert!(!has_keyword("listening on :8080"));
    }

    #[test]
    fn test_failed_reason_events_are_severe() {
        let event = DiagnosticEvent {
            severity: EventSeverity::Warning,
            reason: "FailedMount".to_string(),
            message: String::new(),
            timestamp: None,
        };
        assert!(is_severe(&event));
    }
}
