use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;

use autobuild::errors::{ExecError, Phase};
use autobuild::exec::{PhaseFuture, PhaseRunner};

/// One recorded phase invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Build { source: PathBuf, destination: PathBuf },
    Launch { destination: PathBuf },
}

/// A fake runner that:
/// - records every build / launch in order
/// - optionally fails every build
/// - optionally holds each launch until the test releases it
#[derive(Clone, Default)]
pub struct FakeRunner {
    calls: Arc<Mutex<Vec<Call>>>,
    fail_build: bool,
    launch_gate: Option<Arc<Semaphore>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_build(mut self) -> Self {
        self.fail_build = true;
        self
    }

    /// Each launch blocks until [`FakeRunner::release_launch`] is called.
    pub fn gated_launch(mut self) -> Self {
        self.launch_gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    pub fn release_launch(&self) {
        if let Some(gate) = &self.launch_gate {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn builds(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Build { .. }))
            .count()
    }

    pub fn launches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Launch { .. }))
            .count()
    }

    /// Highest number of build/launch calls that were running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl PhaseRunner for FakeRunner {
    fn build<'a>(&'a self, source: &'a Path, destination: &'a Path) -> PhaseFuture<'a> {
        Box::pin(async move {
            self.enter();
            self.calls.lock().unwrap().push(Call::Build {
                source: source.to_path_buf(),
                destination: destination.to_path_buf(),
            });
            self.leave();

            if self.fail_build {
                return Err(ExecError::Pipe {
                    phase: Phase::Build,
                    stream: "stdout",
                });
            }
            Ok(())
        })
    }

    fn launch<'a>(&'a self, destination: &'a Path) -> PhaseFuture<'a> {
        Box::pin(async move {
            self.enter();
            self.calls.lock().unwrap().push(Call::Launch {
                destination: destination.to_path_buf(),
            });

            if let Some(gate) = &self.launch_gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }

            self.leave();
            Ok(())
        })
    }
}
