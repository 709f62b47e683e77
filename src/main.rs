//! `filecopier <job.json>`: run one transfer job and print its outcome.

use filecopier::{execute, LogReporter, TransferJob};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // stdout carries the outcome JSON; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = std::env::args_os().nth(1) else {
        eprintln!("usage: filecopier <job.json>");
        return ExitCode::from(2);
    };

    let job = match TransferJob::load(&path) {
        Ok(job) => job,
        Err(e) => {
            tracing::error!(error = %e, "cannot load job");
            return ExitCode::from(2);
        }
    };

    tracing::info!(
        protocol = %job.request.protocol,
        direction = %job.request.direction,
        "starting transfer"
    );
    let outcome = execute(&job, Arc::new(LogReporter)).await;

    match serde_json::to_string_pretty(&outcome) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!(error = %e, "cannot serialise outcome"),
    }

    if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
