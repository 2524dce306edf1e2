// src/config/reload.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::model::{
    default_build_args, default_build_program, BuilderSection, ReloadTime,
};

pub const DEFAULT_SOURCE: &str = ".";
pub const DEFAULT_DESTINATION: &str = "bin/app";
pub const DEFAULT_RELOAD_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Effective settings of a builder, resolved from the JSON file, CLI
/// overrides and defaults. Built once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadConfig {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub reload_interval: Duration,
    pub log_level: String,
    pub build: BuildCommand,
    pub watch: WatchSettings,
}

/// Program + argument template for the build phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl BuildCommand {
    /// Arguments with `{source}` / `{destination}` substituted.
    pub fn render_args(&self, source: &Path, destination: &Path) -> Vec<String> {
        let source = source.to_string_lossy();
        let destination = destination.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{source}", &source)
                    .replace("{destination}", &destination)
            })
            .collect()
    }
}

impl Default for BuildCommand {
    fn default() -> Self {
        Self {
            program: default_build_program(),
            args: default_build_args(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSettings {
    pub root: PathBuf,
    pub exclude: Vec<String>,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            exclude: vec![".git/**".to_string(), "**/.git/**".to_string()],
        }
    }
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE),
            destination: PathBuf::from(DEFAULT_DESTINATION),
            reload_interval: DEFAULT_RELOAD_INTERVAL,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            build: BuildCommand::default(),
            watch: WatchSettings::default(),
        }
    }
}

impl ReloadConfig {
    /// Resolve a parsed `builder` section on top of the defaults.
    ///
    /// Only a malformed `reload_time` can fail here.
    pub fn from_section(section: &BuilderSection) -> Result<Self, String> {
        let mut cfg = ReloadConfig::default();

        if let Some(source) = &section.source {
            cfg.source = PathBuf::from(source);
        }
        if let Some(destination) = &section.destination {
            cfg.destination = PathBuf::from(destination);
        }
        if let Some(reload) = &section.reload_time {
            cfg.reload_interval = reload_time_to_duration(reload)?;
        }
        if let Some(level) = &section.log.level {
            cfg.log_level = level.clone();
        }
        if let Some(build) = &section.build {
            cfg.build = BuildCommand {
                program: build.program.clone(),
                args: build.args.clone(),
            };
        }
        if let Some(watch) = &section.watch {
            if let Some(root) = &watch.root {
                cfg.watch.root = root.clone();
            }
            if let Some(exclude) = &watch.exclude {
                cfg.watch.exclude = exclude.clone();
            }
        }

        Ok(cfg)
    }

    /// Apply command-line overrides, producing the final record.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(source) = &overrides.source {
            self.source = source.clone();
        }
        if let Some(destination) = &overrides.destination {
            self.destination = destination.clone();
        }
        if let Some(interval) = overrides.reload_interval {
            self.reload_interval = interval;
        }
        self
    }
}

/// Values supplied on the command line that win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub reload_interval: Option<Duration>,
}

fn reload_time_to_duration(reload: &ReloadTime) -> Result<Duration, String> {
    match reload {
        ReloadTime::Seconds(secs) => Ok(Duration::from_secs(*secs)),
        ReloadTime::Text(text) => parse_duration(text),
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
///
/// A bare number is taken as seconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .unwrap_or(s.len());

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "" | "s" => Ok(Duration::from_secs(value)),
        "m" => seconds_times(value, 60),
        "h" => seconds_times(value, 60 * 60),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}

fn seconds_times(value: u64, factor: u64) -> Result<Duration, String> {
    value
        .checked_mul(factor)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration too large: {value} * {factor}s"))
}
