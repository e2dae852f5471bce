//! # Boot-time fatal policy.
//!
//! Wiring and startup errors are invariant violations: the process should not
//! keep running with a partially wired or partially started system. What
//! "fatal" means is decided by a [`FatalPolicy`] injected into the
//! [`Context`](crate::Context) and the [`Runner`](crate::Runner):
//!
//! - [`ExitProcess`] (default): logs the error and exits with status 1.
//! - [`RecordFatal`]: records the error and returns, so the failing call
//!   returns `Err` to its caller. Intended for tests.

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::RuntimeError;

/// Decides what happens when a boot-time invariant is violated.
pub trait FatalPolicy: Send + Sync + 'static {
    /// Called once per violation, before the failing operation returns `Err`.
    ///
    /// Implementations may diverge (exit the process) or return.
    fn fatal(&self, error: &RuntimeError);
}

/// Logs the error and terminates the process with exit status 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExitProcess;

impl FatalPolicy for ExitProcess {
    fn fatal(&self, error: &RuntimeError) {
        tracing::error!(label = error.as_label(), "fatal: {error}");
        std::process::exit(1);
    }
}

/// Records every violation and lets the caller continue.
///
/// Clones share the same record.
#[derive(Clone, Debug, Default)]
pub struct RecordFatal {
    errors: Arc<Mutex<Vec<RuntimeError>>>,
}

impl RecordFatal {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all recorded errors in order.
    pub fn errors(&self) -> Vec<RuntimeError> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded violations.
    pub fn count(&self) -> usize {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl FatalPolicy for RecordFatal {
    fn fatal(&self, error: &RuntimeError) {
        tracing::error!(label = error.as_label(), "fatal (recorded): {error}");
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error.clone());
    }
}
