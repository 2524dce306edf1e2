// src/exec/process.rs

//! Spawn-with-pipes shared by the build and run phases.

use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::{ExecError, Phase};

/// Run `cmd` to completion.
///
/// stdout is copied to our own stdout while the child runs; stderr is read
/// into a buffer concurrently and only surfaces in the returned error. The
/// child is spawned with `kill_on_drop`, so every early return reaps it.
pub(crate) async fn run_forwarding(phase: Phase, mut cmd: Command) -> Result<ExitStatus, ExecError> {
    let program = cmd.as_std().get_program().to_string_lossy().into_owned();

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
        phase,
        program: program.clone(),
        source,
    })?;

    let mut stdout = child.stdout.take().ok_or(ExecError::Pipe {
        phase,
        stream: "stdout",
    })?;
    let mut stderr = child.stderr.take().ok_or(ExecError::Pipe {
        phase,
        stream: "stderr",
    })?;

    debug!(%phase, %program, pid = ?child.id(), "child process spawned");

    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr.read_to_end(&mut buf).await.map(|_| buf)
    });

    let mut out = tokio::io::stdout();
    if let Err(err) = tokio::io::copy(&mut stdout, &mut out).await {
        warn!(%phase, error = %err, "forwarding child stdout failed");
    }

    let err_buf = match stderr_task.await {
        Ok(Ok(buf)) => buf,
        Ok(Err(err)) => {
            warn!(%phase, error = %err, "reading child stderr failed");
            Vec::new()
        }
        Err(err) => {
            warn!(%phase, error = %err, "stderr reader task failed");
            Vec::new()
        }
    };

    let status = child
        .wait()
        .await
        .map_err(|source| ExecError::Wait { phase, source })?;

    let stderr_text = String::from_utf8_lossy(&err_buf).into_owned();

    if !status.success() {
        return Err(ExecError::Exit {
            phase,
            status,
            stderr: stderr_text,
        });
    }

    if !stderr_text.is_empty() {
        debug!(%phase, "stderr: {}", stderr_text.trim_end());
    }

    Ok(status)
}
