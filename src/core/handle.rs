//! # Cloneable control handle for a running runner.
//!
//! [`Runner::run`](crate::Runner::run) consumes the runner, so readiness and
//! termination are reached through a [`RunnerHandle`] taken beforehand.
//!
//! ```text
//! let handle = runner.handle();
//! tokio::spawn(runner.run());
//! handle.await_ready().await;   // every start() returned Ok
//! handle.kill();                // reverse-order shutdown begins
//! ```

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::state::RunnerState;
use crate::broadcaster::{Broadcaster, Subscription};

/// Handle for observing and terminating a [`Runner`](crate::Runner).
#[derive(Clone, Debug)]
pub struct RunnerHandle {
    state: Broadcaster<RunnerState>,
    termination: CancellationToken,
}

impl RunnerHandle {
    pub(crate) fn new() -> Self {
        Self {
            state: Broadcaster::new(RunnerState::Building),
            termination: CancellationToken::new(),
        }
    }

    pub(crate) fn termination(&self) -> &CancellationToken {
        &self.termination
    }

    pub(crate) async fn publish(&self, state: RunnerState) {
        tracing::debug!(state = state.as_label(), "runner state");
        self.state.next(state).await;
    }

    /// Requests termination, exactly as an OS interrupt would.
    ///
    /// Idempotent. Calling it before `run` makes `run` shut down right after
    /// it becomes ready.
    pub fn kill(&self) {
        if !self.termination.is_cancelled() {
            tracing::info!("termination requested");
        }
        self.termination.cancel();
    }

    /// True once termination was requested by `kill`, a signal, or the
    /// UI-controller returning.
    pub fn is_terminating(&self) -> bool {
        self.termination.is_cancelled()
    }

    /// Waits until every component has started.
    ///
    /// Returns immediately if the runner is already ready (or past it).
    /// Returns `false` if startup was aborted instead; this only happens under
    /// a non-exiting [`FatalPolicy`](crate::FatalPolicy).
    pub async fn await_ready(&self) -> bool {
        let (mut rx, sub) = self.state.subscribe().await;

        let mut current = self.state.value();
        while !current.is_ready() && current != RunnerState::Failed {
            match rx.recv().await {
                Some(next) => current = next,
                None => break,
            }
        }

        // Close the slot first so a publish racing with us cannot wait on it.
        drop(rx);
        sub.unsubscribe().await;
        current.is_ready()
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> RunnerState {
        self.state.value()
    }

    /// Subscribes to lifecycle transitions.
    ///
    /// The receiver must be drained promptly: the runner waits for room in
    /// its slot before moving on to the next lifecycle step.
    pub async fn subscribe_state(&self) -> (mpsc::Receiver<RunnerState>, Subscription<RunnerState>) {
        self.state.subscribe().await
    }
}
