// src/exec/build.rs

use std::path::Path;

use tokio::process::Command;
use tracing::{error, info};

use crate::config::BuildCommand;
use crate::errors::{ExecError, Phase};
use crate::exec::process::run_forwarding;

/// Compiles `source` into `destination` with the configured toolchain.
#[derive(Debug, Clone)]
pub struct BuildRunner {
    command: BuildCommand,
}

impl BuildRunner {
    pub fn new(command: BuildCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &BuildCommand {
        &self.command
    }

    /// Run the build command once.
    ///
    /// On failure the error (carrying captured stderr for non-zero exits) is
    /// logged here and returned to the caller.
    pub async fn run(&self, source: &Path, destination: &Path) -> Result<(), ExecError> {
        let args = self.command.render_args(source, destination);
        info!(
            program = %self.command.program,
            ?args,
            "executing build"
        );

        let mut cmd = Command::new(&self.command.program);
        cmd.args(&args);

        match run_forwarding(Phase::Build, cmd).await {
            Ok(_) => {
                info!("build completed");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "error executing build");
                Err(err)
            }
        }
    }
}
