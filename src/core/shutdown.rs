//! # OS signals translated into runner termination.
//!
//! [`spawn_signal_listener`] cancels the runner's termination token when the
//! process receives a termination signal, so an external interrupt and
//! [`RunnerHandle::kill`](crate::RunnerHandle::kill) take the same path.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Spawns a task that cancels `termination` on the first OS termination signal.
///
/// The task exits on its own once `termination` is cancelled by anyone else.
/// If the signal handlers cannot be installed the failure is logged and the
/// token is left alone; [`kill`](crate::RunnerHandle::kill) still works.
pub(crate) fn spawn_signal_listener(termination: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = termination.cancelled() => {}
            res = wait_for_shutdown_signal() => match res {
                Ok(()) => {
                    tracing::info!("termination signal received");
                    termination.cancel();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "cannot install OS signal handlers; only kill() will terminate");
                }
            },
        }
    })
}

/// Waits for a termination signal.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
