// src/exec/launch.rs

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{error, info};

use crate::errors::{ExecError, Phase};
use crate::exec::process::run_forwarding;

/// Runs the freshly built binary and waits for it to exit.
///
/// While the child is alive the caller is blocked; the reload loop observes
/// no further change events until it exits.
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(&self, destination: &Path) -> Result<(), ExecError> {
        let program = executable_path(destination);
        info!(binary = %program.display(), "executing start");

        match run_forwarding(Phase::Run, Command::new(&program)).await {
            Ok(status) => {
                info!(%status, "start completed");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "error executing restart");
                Err(err)
            }
        }
    }
}

/// Relative destinations are resolved against the working directory
/// (`bin/app` runs as `./bin/app`), never looked up on `PATH`.
pub fn executable_path(destination: &Path) -> PathBuf {
    if destination.is_absolute() || destination.starts_with(".") {
        destination.to_path_buf()
    } else {
        Path::new(".").join(destination)
    }
}
