// src/config/mod.rs

//! Configuration loading for autobuild.
//!
//! - `model.rs`: the JSON-backed data model of `config/app.<env>.json`.
//! - `loader.rs`: environment resolution and reading the file from disk.
//! - `reload.rs`: the resolved, immutable [`ReloadConfig`] plus defaults.

pub mod loader;
pub mod model;
pub mod reload;

pub use loader::{config_path_for_env, current_env, load_from_path, load_reload_config};
pub use model::{AppConfig, BuildSection, BuilderSection, LogSection, ReloadTime, WatchSection};
pub use reload::{parse_duration, BuildCommand, ConfigOverrides, ReloadConfig, WatchSettings};
