// src/logging.rs

//! Logging setup for `autobuild` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `AUTOBUILD_LOG` environment variable (e.g. "info", "debug")
//! 3. `builder.log.level` from the JSON config, applied once it is loaded
//! 4. default to `warn`
//!
//! Logs are sent to STDERR; STDOUT carries the output of the build and of
//! the launched binary.

use anyhow::Result;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, Registry};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "AUTOBUILD_LOG";

/// Handle to the installed subscriber's level filter.
///
/// Passed to [`crate::engine::Builder::new`] so the level from the config
/// file can be applied after the subscriber already exists.
#[derive(Debug, Clone)]
pub struct LogHandle {
    filter: reload::Handle<LevelFilter, Registry>,
    /// Level came from the CLI or the environment; config must not override it.
    pinned: bool,
}

impl LogHandle {
    /// Apply a level named in the config file, unless one was pinned at startup.
    pub fn apply_config_level(&self, level: &str) {
        if self.pinned {
            debug!(config_level = level, "log level pinned by CLI/env; ignoring config level");
            return;
        }

        match parse_level_str(level) {
            Some(filter) => {
                if let Err(err) = self.filter.modify(|current| *current = filter) {
                    tracing::warn!(error = %err, "failed to reconfigure log level");
                    return;
                }
                debug!("setting log level to {}", filter);
            }
            None => tracing::warn!(config_level = level, "unknown log level in config; keeping current level"),
        }
    }

    pub fn current_level(&self) -> Option<LevelFilter> {
        self.filter.clone_current()
    }
}

/// Initialise global logging subscriber.
///
/// Safe to call once at startup; a second call returns an error.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<LogHandle> {
    let pinned = match cli_level {
        Some(lvl) => Some(level_from_log_level(lvl)),
        None => std::env::var(LOG_ENV_VAR)
            .ok()
            .and_then(|s| parse_level_str(&s)),
    };

    let (filter, handle) = reload::Layer::new(pinned.unwrap_or(LevelFilter::WARN));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_writer(std::io::stderr),
        )
        .try_init()?;

    Ok(LogHandle {
        filter: handle,
        pinned: pinned.is_some(),
    })
}

fn level_from_log_level(lvl: LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}

/// Parse a level name as written in config files or `AUTOBUILD_LOG`.
pub fn parse_level_str(s: &str) -> Option<LevelFilter> {
    match s.trim().to_lowercase().as_str() {
        "error" | "fatal" | "panic" => Some(LevelFilter::ERROR),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        "off" | "none" => Some(LevelFilter::OFF),
        _ => None,
    }
}
