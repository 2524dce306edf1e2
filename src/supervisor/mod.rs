// src/supervisor/mod.rs

//! Lifecycle management for auxiliary background components.
//!
//! The builder does not start the file watcher directly; it registers it as
//! a [`Process`] with a [`Supervisor`] and starts/stops the supervisor as a
//! whole.

use std::fmt;

use tracing::{debug, info, warn};

use crate::errors::{BuilderError, Result};

/// A long-running component that can be started and stopped.
pub trait Process: Send {
    fn name(&self) -> &str;

    fn start(&mut self) -> anyhow::Result<()>;

    fn stop(&mut self) -> anyhow::Result<()>;
}

/// Starts registered processes in order and stops them in reverse.
#[derive(Default)]
pub struct Supervisor {
    processes: Vec<Box<dyn Process>>,
    started: bool,
}

impl fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("processes", &self.process_names())
            .field("started", &self.started)
            .finish()
    }
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_process(&mut self, process: impl Process + 'static) {
        debug!(process = process.name(), "registering process");
        self.processes.push(Box::new(process));
    }

    pub fn process_names(&self) -> Vec<&str> {
        self.processes.iter().map(|p| p.name()).collect()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Start every process. If one fails, the ones already started are
    /// stopped again and the failure is returned.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            debug!("supervisor already started");
            return Ok(());
        }

        for idx in 0..self.processes.len() {
            let process = &mut self.processes[idx];
            info!(process = process.name(), "starting process");

            if let Err(source) = process.start() {
                let name = process.name().to_string();
                for started in self.processes[..idx].iter_mut().rev() {
                    if let Err(err) = started.stop() {
                        warn!(process = started.name(), error = %err, "rollback stop failed");
                    }
                }
                return Err(BuilderError::Supervisor {
                    process: name,
                    source,
                });
            }
        }

        self.started = true;
        Ok(())
    }

    /// Stop every process in reverse registration order.
    ///
    /// All processes are asked to stop even if one fails; the first failure
    /// is returned.
    pub fn stop(&mut self) -> Result<()> {
        if !self.started {
            debug!("supervisor not started; nothing to stop");
            return Ok(());
        }
        self.started = false;

        let mut first_err = None;
        for process in self.processes.iter_mut().rev() {
            info!(process = process.name(), "stopping process");
            if let Err(source) = process.stop() {
                warn!(process = process.name(), error = %source, "process failed to stop");
                if first_err.is_none() {
                    first_err = Some(BuilderError::Supervisor {
                        process: process.name().to_string(),
                        source,
                    });
                }
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
