use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::anyhow;

use autobuild::supervisor::Process;

/// Shared counters for a [`FakeProcess`], readable after the process has
/// been moved into a supervisor.
#[derive(Debug, Clone, Default)]
pub struct ProcessCounters {
    starts: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
    log: Option<Arc<std::sync::Mutex<Vec<String>>>>,
}

impl ProcessCounters {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

/// A supervised process that only counts lifecycle calls.
#[derive(Debug)]
pub struct FakeProcess {
    name: String,
    fail_start: bool,
    fail_stop: bool,
    counters: ProcessCounters,
}

impl FakeProcess {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail_start: false,
            fail_stop: false,
            counters: ProcessCounters::default(),
        }
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    /// Append `"start:<name>"` / `"stop:<name>"` to a shared journal.
    pub fn journal(mut self, log: Arc<std::sync::Mutex<Vec<String>>>) -> Self {
        self.counters.log = Some(log);
        self
    }

    pub fn counters(&self) -> ProcessCounters {
        self.counters.clone()
    }

    fn record(&self, what: &str) {
        if let Some(log) = &self.counters.log {
            log.lock().unwrap().push(format!("{what}:{}", self.name));
        }
    }
}

impl Process for FakeProcess {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) -> anyhow::Result<()> {
        self.record("start");
        if self.fail_start {
            return Err(anyhow!("{} refused to start", self.name));
        }
        self.counters.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        self.record("stop");
        self.counters.stops.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop {
            return Err(anyhow!("{} refused to stop", self.name));
        }
        Ok(())
    }
}
