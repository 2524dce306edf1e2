// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::AppConfig;
use crate::config::reload::ReloadConfig;
use crate::errors::{BuilderError, Result};

/// Environment variable naming the active environment.
pub const ENV_VAR: &str = "env";

/// Environment used when `env` is unset or empty.
pub const DEFAULT_ENV: &str = "local";

/// Name of the active environment (`env` variable, else `local`).
pub fn current_env() -> String {
    std::env::var(ENV_VAR)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_ENV.to_string())
}

/// Path of the JSON descriptor for an environment: `config/app.<env>.json`.
pub fn config_path_for_env(env: &str) -> PathBuf {
    PathBuf::from("config").join(format!("app.{env}.json"))
}

/// Read and deserialize the JSON descriptor at `path`.
///
/// This only performs deserialization; resolving values into a
/// [`ReloadConfig`] happens in [`load_reload_config`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| BuilderError::Config {
        path: path.to_path_buf(),
        message: format!("reading config file: {e}"),
    })?;

    serde_json::from_str(&contents).map_err(|e| BuilderError::Config {
        path: path.to_path_buf(),
        message: format!("parsing JSON config: {e}"),
    })
}

/// Load the descriptor at `path` and resolve it into a [`ReloadConfig`].
///
/// A document without a `builder` object resolves to the defaults.
pub fn load_reload_config(path: impl AsRef<Path>) -> Result<ReloadConfig> {
    let path = path.as_ref();
    let app = load_from_path(path)?;

    match app.builder {
        Some(section) => {
            ReloadConfig::from_section(&section).map_err(|message| BuilderError::Config {
                path: path.to_path_buf(),
                message,
            })
        }
        None => Ok(ReloadConfig::default()),
    }
}
