// src/engine/builder.rs

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_utils::sync::WaitGroup;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::{
    config_path_for_env, current_env, load_reload_config, ConfigOverrides, ReloadConfig,
};
use crate::engine::reload_loop::ReloadLoop;
use crate::engine::signals::TerminationSignals;
use crate::errors::{BuilderError, Result};
use crate::exec::{PhaseRunner, ToolchainRunner};
use crate::logging::LogHandle;
use crate::supervisor::Supervisor;
use crate::watch::{event_channel, EventReceiver, ExcludeFilter, FsWatcher};

/// Construction options for [`Builder::new`].
#[derive(Debug, Clone)]
pub struct BuilderOptions {
    env: Option<String>,
    config_path: Option<PathBuf>,
    overrides: ConfigOverrides,
    log_handle: Option<LogHandle>,
    handle_signals: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            env: None,
            config_path: None,
            overrides: ConfigOverrides::default(),
            log_handle: None,
            handle_signals: true,
        }
    }
}

impl BuilderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment name; selects `config/app.<env>.json`.
    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    /// Read this file instead of the environment's default descriptor.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_reload_time(mut self, interval: Duration) -> Self {
        self.overrides.reload_interval = Some(interval);
        self
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.overrides.source = Some(source.into());
        self
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.overrides.destination = Some(destination.into());
        self
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_log_handle(mut self, handle: LogHandle) -> Self {
        self.log_handle = Some(handle);
        self
    }

    /// Whether the reload loop listens for SIGINT/SIGTERM/SIGUSR1 itself.
    pub fn with_signal_handling(mut self, enabled: bool) -> Self {
        self.handle_signals = enabled;
        self
    }

    fn resolved_config_path(&self) -> PathBuf {
        match &self.config_path {
            Some(path) => path.clone(),
            None => {
                let env = self.env.clone().unwrap_or_else(current_env);
                config_path_for_env(&env)
            }
        }
    }
}

struct OrchestratorState {
    started: bool,
    quit: Option<oneshot::Sender<()>>,
    supervisor: Supervisor,
    /// Handed to the loop on the first `start`.
    events: Option<EventReceiver>,
    task: Option<JoinHandle<()>>,
}

/// The reload orchestrator.
///
/// Owns the configuration, the supervisor (and through it the file
/// watcher) and the background reload loop. There is no process-wide
/// instance: construct one with [`Builder::new`] or [`Builder::from_parts`]
/// and tear it down with [`Builder::stop`].
pub struct Builder {
    config: Arc<ReloadConfig>,
    runner: Arc<dyn PhaseRunner>,
    handle_signals: bool,
    state: Mutex<OrchestratorState>,
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("config", &self.config)
            .field("started", &self.started())
            .finish_non_exhaustive()
    }
}

impl Builder {
    /// Load configuration and wire up the file watcher.
    ///
    /// A missing or malformed config file is logged and the defaults are
    /// used; construction itself never fails.
    pub fn new(options: BuilderOptions) -> Self {
        let path = options.resolved_config_path();

        let file_config = match load_reload_config(&path) {
            Ok(cfg) => {
                debug!(path = ?path, "configuration loaded");
                if let Some(handle) = &options.log_handle {
                    handle.apply_config_level(&cfg.log_level);
                }
                cfg
            }
            Err(err) => {
                error!(error = %err, "failed to load configuration; using defaults");
                ReloadConfig::default()
            }
        };

        let config = file_config.with_overrides(&options.overrides);

        let filter = match ExcludeFilter::new(&config.watch.exclude, &config.destination) {
            Ok(filter) => filter,
            Err(err) => {
                error!(error = %err, "invalid watch exclude patterns; excluding nothing");
                ExcludeFilter::empty()
            }
        };

        let (events_tx, events_rx) = event_channel();
        let mut supervisor = Supervisor::new();
        supervisor.add_process(FsWatcher::new(config.watch.root.clone(), filter, events_tx));

        let runner = Arc::new(ToolchainRunner::new(config.build.clone()));

        Self::from_parts(config, supervisor, events_rx, runner)
            .with_signal_handling(options.handle_signals)
    }

    /// Assemble a builder from explicit collaborators.
    ///
    /// `events` is the stream fed by whatever change source `supervisor`
    /// runs. Signal handling is enabled by default.
    pub fn from_parts(
        config: ReloadConfig,
        supervisor: Supervisor,
        events: EventReceiver,
        runner: Arc<dyn PhaseRunner>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            runner,
            handle_signals: true,
            state: Mutex::new(OrchestratorState {
                started: false,
                quit: None,
                supervisor,
                events: Some(events),
                task: None,
            }),
        }
    }

    pub fn with_signal_handling(mut self, enabled: bool) -> Self {
        self.handle_signals = enabled;
        self
    }

    pub fn config(&self) -> &ReloadConfig {
        &self.config
    }

    /// Start the supervisor, then spawn the reload loop.
    ///
    /// Must be called from within a Tokio runtime. If the supervisor fails
    /// to start, the error is returned and the loop is not started. `done`
    /// is released when this call returns.
    pub fn start(&self, done: Option<WaitGroup>) -> Result<()> {
        let _done = done;
        let mut state = self.state.lock();

        if state.started {
            debug!("builder already started");
            return Ok(());
        }
        if state.events.is_none() {
            return Err(BuilderError::EventStreamConsumed);
        }

        let signals = if self.handle_signals {
            TerminationSignals::install()?
        } else {
            TerminationSignals::disabled()
        };

        state.supervisor.start()?;

        let events = state.events.take().ok_or(BuilderError::EventStreamConsumed)?;
        let (quit_tx, quit_rx) = oneshot::channel();

        let reload_loop = ReloadLoop {
            config: Arc::clone(&self.config),
            events,
            runner: Arc::clone(&self.runner),
            signals,
            quit: quit_rx,
        };

        state.quit = Some(quit_tx);
        state.started = true;
        state.task = Some(tokio::spawn(reload_loop.run()));

        info!(
            source = %self.config.source.display(),
            destination = %self.config.destination.display(),
            reload_interval = ?self.config.reload_interval,
            "builder started"
        );
        Ok(())
    }

    /// Stop the supervisor and ask the reload loop to quit.
    ///
    /// An in-flight build or run is not interrupted; the loop exits at the
    /// top of its next cycle. Calling `stop` on a builder that is not
    /// started does nothing. `done` is released when this call returns.
    pub fn stop(&self, done: Option<WaitGroup>) -> Result<()> {
        let _done = done;
        let mut state = self.state.lock();

        if !state.started {
            debug!("builder not started; nothing to stop");
            return Ok(());
        }

        state.started = false;
        let result = state.supervisor.stop();

        if let Some(quit) = state.quit.take() {
            // The loop may already be gone (signal or closed stream).
            let _ = quit.send(());
        }

        info!("builder stopped");
        result
    }

    pub fn started(&self) -> bool {
        self.state.lock().started
    }

    /// Wait for the reload loop task to finish.
    ///
    /// Returns immediately if the loop was never started or has already
    /// been awaited.
    pub async fn wait(&self) {
        let task = self.state.lock().task.take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                error!(error = %err, "reload loop task failed");
            }
        }
    }
}
