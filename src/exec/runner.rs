// src/exec/runner.rs

//! Pluggable build/run abstraction.
//!
//! The reload loop talks to a `PhaseRunner` instead of spawning processes
//! itself, so tests can swap in a fake that records invocations.
//!
//! - `ToolchainRunner` is the production implementation: it composes
//!   [`BuildRunner`] and [`ProcessLauncher`].

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::config::BuildCommand;
use crate::errors::ExecError;
use crate::exec::build::BuildRunner;
use crate::exec::launch::ProcessLauncher;

pub type PhaseFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ExecError>> + Send + 'a>>;

/// Executes the two phases of a reload cycle.
pub trait PhaseRunner: Send + Sync {
    /// Compile `source` into `destination`.
    fn build<'a>(&'a self, source: &'a Path, destination: &'a Path) -> PhaseFuture<'a>;

    /// Start `destination` and resolve once it has exited.
    fn launch<'a>(&'a self, destination: &'a Path) -> PhaseFuture<'a>;
}

#[derive(Debug, Clone)]
pub struct ToolchainRunner {
    build: BuildRunner,
    launcher: ProcessLauncher,
}

impl ToolchainRunner {
    pub fn new(command: BuildCommand) -> Self {
        Self {
            build: BuildRunner::new(command),
            launcher: ProcessLauncher::new(),
        }
    }
}

impl PhaseRunner for ToolchainRunner {
    fn build<'a>(&'a self, source: &'a Path, destination: &'a Path) -> PhaseFuture<'a> {
        Box::pin(self.build.run(source, destination))
    }

    fn launch<'a>(&'a self, destination: &'a Path) -> PhaseFuture<'a> {
        Box::pin(self.launcher.run(destination))
    }
}
