// src/errors.rs

//! Crate-wide error types.
//!
//! `BuilderError` is what the lifecycle surface (`Builder::start` /
//! `Builder::stop`) and config loading return. Process failures during a
//! build or run are described by [`ExecError`]; the reload loop only logs
//! those, it never propagates them.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Which step of a reload cycle a child process belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Build,
    Run,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Build => f.write_str("build"),
            Phase::Run => f.write_str("run"),
        }
    }
}

/// Failure of a single build or run invocation.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("{phase}: error getting {stream} pipe")]
    Pipe { phase: Phase, stream: &'static str },

    #[error("{phase}: error executing command {program:?}: {source}")]
    Spawn {
        phase: Phase,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{phase}: error waiting for process: {source}")]
    Wait {
        phase: Phase,
        #[source]
        source: std::io::Error,
    },

    #[error("{phase}: process exited with {status}: {stderr}")]
    Exit {
        phase: Phase,
        status: ExitStatus,
        stderr: String,
    },
}

impl ExecError {
    pub fn phase(&self) -> Phase {
        match self {
            ExecError::Pipe { phase, .. }
            | ExecError::Spawn { phase, .. }
            | ExecError::Wait { phase, .. }
            | ExecError::Exit { phase, .. } => *phase,
        }
    }

    /// Captured standard error of the child, if it got far enough to exit.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ExecError::Exit { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum BuilderError {
    #[error("Configuration error in {path:?}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("process '{process}' failed: {source}")]
    Supervisor {
        process: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("change event stream already consumed; a stopped builder cannot be restarted")]
    EventStreamConsumed,

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BuilderError>;
