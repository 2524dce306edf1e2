// src/engine/mod.rs

//! Reload orchestration for autobuild.
//!
//! - [`builder`]: the `Builder` lifecycle surface (`start` / `stop` /
//!   `started`) and its guarded state.
//! - [`reload_loop`]: the background task that waits, receives a change
//!   event, builds, then runs the binary.
//! - [`signals`]: interrupt / terminate / user-1 handling.

pub mod builder;
mod reload_loop;
pub mod signals;

pub use builder::{Builder, BuilderOptions};
pub use signals::TerminationSignals;
