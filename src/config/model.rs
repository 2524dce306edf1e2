// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from `config/app.<env>.json`.
///
/// ```json
/// {
///   "builder": {
///     "source": "./app",
///     "destination": "bin/app",
///     "reload_time": 1,
///     "log": { "level": "info" }
///   }
/// }
/// ```
///
/// Every field is optional; missing values fall back to the defaults in
/// [`crate::config::ReloadConfig`].
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub builder: Option<BuilderSection>,
}

/// The `builder` object.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BuilderSection {
    /// Module / package path handed to the build command.
    #[serde(default)]
    pub source: Option<String>,

    /// Output binary path, also the binary that gets launched.
    #[serde(default)]
    pub destination: Option<String>,

    /// Pause before each wait for a change event.
    #[serde(default)]
    pub reload_time: Option<ReloadTime>,

    #[serde(default)]
    pub log: LogSection,

    /// Toolchain command override. If absent, `go build` is used.
    #[serde(default)]
    pub build: Option<BuildSection>,

    #[serde(default)]
    pub watch: Option<WatchSection>,
}

/// `reload_time` may be a bare number of seconds or a duration string such
/// as `"250ms"` or `"3s"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ReloadTime {
    Seconds(u64),
    Text(String),
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogSection {
    #[serde(default)]
    pub level: Option<String>,
}

/// `builder.build`: the toolchain invocation.
///
/// Arguments may contain `{source}` and `{destination}` placeholders.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    #[serde(default = "default_build_program")]
    pub program: String,

    #[serde(default = "default_build_args")]
    pub args: Vec<String>,
}

pub(crate) fn default_build_program() -> String {
    "go".to_string()
}

pub(crate) fn default_build_args() -> Vec<String> {
    ["build", "-o", "{destination}", "{source}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// `builder.watch`: what the change detector observes.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WatchSection {
    /// Directory watched recursively. Defaults to the working directory.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Globs (relative to `root`) whose changes are never reported.
    ///
    /// Replaces the default exclude list when present.
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
}
