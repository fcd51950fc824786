//! kubectl-triage: diagnostic snapshot for a failed pod.
//!
//! Run `kubectl triage --help` for usage information.

// CLI binaries legitimately need println! for user output
#![allow(clippy::disallowed_macros)]

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use triage::config::{OutputFormat, TriageArgs};
use triage::render::Renderer;
use triage::{KubeSource, TriageEngine};

#[tokio::main]
async fn main() -> ExitCode {
    let args = TriageArgs::parse();

    // Initialize tracing
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red());
            ExitCode::FAILURE
        }
    }
}

async fn run(args: TriageArgs) -> Result<()> {
    let source = KubeSource::connect(args.kubeconfig.as_deref(), args.context.as_deref()).await?;
    let namespace = args.resolve_namespace(Some(source.default_namespace()));
    let request = args.to_request(namespace);
    debug!(pod = %request.name, namespace = %request.namespace, "Starting triage");

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let engine = TriageEngine::from_source(Arc::new(source));
    let outcome = engine.run(&request, &cancel).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => Renderer::new(!args.no_color, request.logs.tail_lines)
            .render(&outcome, &mut out)
            .context("Failed to write triage report")?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &outcome)
                .context("Failed to serialize triage report")?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
