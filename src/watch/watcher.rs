// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::supervisor::Process;
use crate::watch::event::{ChangeEvent, Operation};
use crate::watch::filter::{relative_str, ExcludeFilter};

pub type EventSender = mpsc::UnboundedSender<ChangeEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ChangeEvent>;

/// The stream the watcher writes to and the reload loop reads from.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Filesystem change detector, managed by the supervisor.
///
/// `start` creates a recursive `notify` watcher over `root`; `stop` drops
/// it together with the event sender, which closes the stream for the
/// reader.
pub struct FsWatcher {
    root: PathBuf,
    filter: Arc<ExcludeFilter>,
    events_tx: Option<EventSender>,
    inner: Option<RecommendedWatcher>,
}

impl std::fmt::Debug for FsWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsWatcher")
            .field("root", &self.root)
            .field("filter", &self.filter)
            .field("running", &self.inner.is_some())
            .finish()
    }
}

impl FsWatcher {
    pub fn new(root: impl Into<PathBuf>, filter: ExcludeFilter, events_tx: EventSender) -> Self {
        Self {
            root: root.into(),
            filter: Arc::new(filter),
            events_tx: Some(events_tx),
            inner: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.is_some()
    }
}

impl Process for FsWatcher {
    fn name(&self) -> &str {
        "watcher"
    }

    fn start(&mut self) -> Result<()> {
        if self.inner.is_some() {
            return Ok(());
        }

        let events_tx = self
            .events_tx
            .clone()
            .ok_or_else(|| anyhow!("event stream already closed"))?;

        let root = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());
        let filter = Arc::clone(&self.filter);
        let cb_root = root.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => forward_event(&cb_root, &filter, &events_tx, event),
                Err(err) => warn!(error = %err, "file watch error"),
            },
            Config::default(),
        )
        .context("creating file watcher")?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .with_context(|| format!("watching {:?}", root))?;

        info!("file watcher started on {:?}", root);
        self.inner = Some(watcher);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.inner.take();
        self.events_tx.take();
        info!("file watcher stopped");
        Ok(())
    }
}

/// Runs on notify's thread: classify each path and push it to the stream.
fn forward_event(root: &std::path::Path, filter: &ExcludeFilter, tx: &EventSender, event: Event) {
    let operation = Operation::from_kind(&event.kind);

    for path in event.paths {
        if let Some(rel) = relative_str(root, &path) {
            if filter.is_excluded(&rel) {
                debug!(path = %rel, "ignoring excluded path");
                continue;
            }
        }

        debug!(%operation, path = ?path, "change detected");
        if tx.send(ChangeEvent::new(operation, path)).is_err() {
            debug!("change event stream closed; dropping event");
            return;
        }
    }
}
