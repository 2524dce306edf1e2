// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod supervisor;
pub mod watch;

use anyhow::Result;
use tracing::info;

use crate::cli::CliArgs;
use crate::engine::{Builder, BuilderOptions, TerminationSignals};
use crate::logging::LogHandle;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (inside `Builder::new`)
/// - the supervised file watcher
/// - the reload loop
/// - signal handling and teardown
pub async fn run(args: CliArgs, log: LogHandle) -> Result<()> {
    let mut options = BuilderOptions::new()
        .with_overrides(args.overrides())
        .with_log_handle(log);
    if let Some(env) = &args.env {
        options = options.with_env(env.clone());
    }
    if let Some(path) = &args.config {
        options = options.with_config_path(path.clone());
    }

    let builder = Builder::new(options);
    builder.start(None)?;

    let mut signals = TerminationSignals::install()?;
    tokio::select! {
        signal = signals.recv() => info!(signal, "shutting down"),
        _ = builder.wait() => info!("reload loop exited"),
    }

    builder.stop(None)?;
    Ok(())
}
