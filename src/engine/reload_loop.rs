// src/engine/reload_loop.rs

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ReloadConfig;
use crate::engine::signals::TerminationSignals;
use crate::exec::PhaseRunner;
use crate::watch::{ChangeEvent, EventReceiver};

/// Why the wait step woke up.
enum Wake {
    Signal(&'static str),
    Quit,
    Tick,
}

/// The single background task driving watch -> build -> restart.
///
/// Strictly sequential: a cycle waits for the build and the launched
/// binary to finish before it looks at the next event. Signals and the quit
/// request are only observed at the top of a cycle.
pub(crate) struct ReloadLoop {
    pub(crate) config: Arc<ReloadConfig>,
    pub(crate) events: EventReceiver,
    pub(crate) runner: Arc<dyn PhaseRunner>,
    pub(crate) signals: TerminationSignals,
    pub(crate) quit: oneshot::Receiver<()>,
}

impl ReloadLoop {
    pub(crate) async fn run(mut self) {
        debug!("executing builder");

        loop {
            let wake = tokio::select! {
                signal = self.signals.recv() => Wake::Signal(signal),
                _ = &mut self.quit => Wake::Quit,
                _ = sleep(self.config.reload_interval) => Wake::Tick,
            };

            match wake {
                Wake::Signal(signal) => {
                    info!(signal, "received term signal");
                    break;
                }
                Wake::Quit => {
                    info!("received shutdown signal");
                    break;
                }
                Wake::Tick => {}
            }

            info!("watching changes...");

            // Blocks until the next event; the interval only paces when we
            // start waiting.
            let Some(event) = self.events.recv().await else {
                info!("change event stream closed");
                break;
            };

            handle_event(&self.config, self.runner.as_ref(), event).await;
        }

        info!("reload loop finished");
    }
}

async fn handle_event(config: &ReloadConfig, runner: &dyn PhaseRunner, event: ChangeEvent) {
    if !event.operation.triggers_rebuild() {
        debug!(operation = %event.operation, file = ?event.file, "ignoring event");
        return;
    }

    info!("{} file {}", event.operation, event.file.display());

    // A failed build still restarts whatever binary is at `destination`.
    if let Err(err) = runner.build(&config.source, &config.destination).await {
        warn!(error = %err, "build failed; starting existing binary");
    }

    // The launcher has already logged a failed run.
    let _ = runner.launch(&config.destination).await;
}
