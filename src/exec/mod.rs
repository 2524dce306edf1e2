// src/exec/mod.rs

//! Process execution layer.
//!
//! Runs the build command and the built binary using
//! `tokio::process::Command`, one child at a time.
//!
//! - [`build`] owns the build phase (`BuildRunner`).
//! - [`launch`] owns the run phase (`ProcessLauncher`).
//! - [`runner`] provides the `PhaseRunner` trait the reload loop drives, and
//!   the production `ToolchainRunner`.

pub mod build;
pub mod launch;
mod process;
pub mod runner;

pub use build::BuildRunner;
pub use launch::{executable_path, ProcessLauncher};
pub use runner::{PhaseFuture, PhaseRunner, ToolchainRunner};
