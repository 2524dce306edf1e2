// src/engine/signals.rs

//! OS termination signals observed by the reload loop and by `main`.

use std::io;

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

/// Interrupt, terminate and user-defined-1 (unix) or Ctrl-C (elsewhere).
///
/// A disabled instance never fires; embedders that handle signals
/// themselves and tests use it.
#[derive(Debug)]
pub struct TerminationSignals {
    inner: Option<Inner>,
}

#[cfg(unix)]
#[derive(Debug)]
struct Inner {
    interrupt: Signal,
    terminate: Signal,
    user1: Signal,
}

#[cfg(not(unix))]
#[derive(Debug)]
struct Inner;

impl TerminationSignals {
    /// Register the signal handlers. Must be called inside a Tokio runtime.
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            inner: Some(Inner {
                interrupt: signal(SignalKind::interrupt())?,
                terminate: signal(SignalKind::terminate())?,
                user1: signal(SignalKind::user_defined1())?,
            }),
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> io::Result<Self> {
        Ok(Self { inner: Some(Inner) })
    }

    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Resolve with the name of the next received signal.
    pub async fn recv(&mut self) -> &'static str {
        let Some(inner) = self.inner.as_mut() else {
            return std::future::pending().await;
        };
        inner.recv().await
    }
}

impl Inner {
    #[cfg(unix)]
    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
            _ = self.user1.recv() => "SIGUSR1",
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) -> &'static str {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "ctrl-c",
            Err(_) => std::future::pending().await,
        }
    }
}
