// src/watch/event.rs

use std::fmt;
use std::path::PathBuf;

use notify::event::ModifyKind;
use notify::EventKind;

/// Kind of filesystem change carried by a [`ChangeEvent`].
///
/// Only [`Operation::Changed`] starts a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Changed,
    Created,
    Removed,
    Renamed,
    Other,
}

impl Operation {
    /// Classify a `notify` event kind.
    pub fn from_kind(kind: &EventKind) -> Self {
        match kind {
            EventKind::Modify(ModifyKind::Name(_)) => Operation::Renamed,
            EventKind::Modify(_) => Operation::Changed,
            EventKind::Create(_) => Operation::Created,
            EventKind::Remove(_) => Operation::Removed,
            _ => Operation::Other,
        }
    }

    pub fn triggers_rebuild(self) -> bool {
        self == Operation::Changed
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Changed => "changed",
            Operation::Created => "created",
            Operation::Removed => "removed",
            Operation::Renamed => "renamed",
            Operation::Other => "other",
        };
        f.write_str(s)
    }
}

/// A single change notification: what happened, and to which path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub operation: Operation,
    pub file: PathBuf,
}

impl ChangeEvent {
    pub fn new(operation: Operation, file: impl Into<PathBuf>) -> Self {
        Self {
            operation,
            file: file.into(),
        }
    }
}
