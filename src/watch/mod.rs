// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`) as a
//!   supervised [`crate::supervisor::Process`].
//! - Turning raw notifications into [`ChangeEvent`]s on an mpsc stream.
//! - Dropping paths that match exclude globs (the build output in
//!   particular).
//!
//! It does **not** decide whether a change leads to a rebuild; that is up to
//! the reload loop in [`crate::engine`].

pub mod event;
pub mod filter;
pub mod watcher;

pub use event::{ChangeEvent, Operation};
pub use filter::{relative_str, ExcludeFilter};
pub use watcher::{event_channel, EventReceiver, EventSender, FsWatcher};
