// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::{parse_duration, ConfigOverrides};

/// Command-line arguments for `autobuild`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "autobuild",
    version,
    about = "Rebuild and restart a binary whenever its sources change.",
    long_about = None
)]
pub struct CliArgs {
    /// Environment name selecting `config/app.<ENV>.json`.
    ///
    /// If omitted, the `env` environment variable or `local` is used.
    #[arg(long, value_name = "ENV")]
    pub env: Option<String>,

    /// Explicit path to the JSON config, bypassing the environment lookup.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Module / package path to compile (overrides `builder.source`).
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Output binary path (overrides `builder.destination`).
    #[arg(long, value_name = "PATH")]
    pub destination: Option<PathBuf>,

    /// Pause between wait cycles, e.g. `1`, `500ms`, `2s`.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub reload_time: Option<Duration>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `AUTOBUILD_LOG`, the config file or `warn` is used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            source: self.source.clone(),
            destination: self.destination.clone(),
            reload_interval: self.reload_time,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
