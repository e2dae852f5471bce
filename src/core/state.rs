use std::fmt;

/// Lifecycle state of a [`Runner`](crate::Runner).
///
/// States are published in declaration order through the runner's state
/// broadcaster. [`Failed`](RunnerState::Failed) replaces the tail of the
/// sequence when startup is aborted under a non-exiting fatal policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RunnerState {
    /// Components are being created and registered.
    Building,
    /// Services are being started in creation order.
    ServicesStarting,
    /// Controllers are being started in creation order.
    ControllersStarting,
    /// The UI-controller is being started.
    UiStarting,
    /// Everything started; the ready signal fired.
    Ready,
    /// Waiting for termination (or inside the UI-controller's loop).
    Running,
    /// The UI-controller is being stopped.
    UiStopping,
    /// Controllers are being stopped in reverse creation order.
    ControllersStopping,
    /// Services are being stopped in reverse creation order.
    ServicesStopping,
    /// Shutdown finished.
    Terminated,
    /// Startup was aborted by a boot-time error.
    Failed,
}

impl RunnerState {
    /// True once every component started successfully (including after shutdown).
    pub fn is_ready(&self) -> bool {
        *self >= RunnerState::Ready && *self != RunnerState::Failed
    }

    /// True for [`Terminated`](RunnerState::Terminated) and [`Failed`](RunnerState::Failed).
    pub fn is_final(&self) -> bool {
        matches!(self, RunnerState::Terminated | RunnerState::Failed)
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunnerState::Building => "building",
            RunnerState::ServicesStarting => "services_starting",
            RunnerState::ControllersStarting => "controllers_starting",
            RunnerState::UiStarting => "ui_starting",
            RunnerState::Ready => "ready",
            RunnerState::Running => "running",
            RunnerState::UiStopping => "ui_stopping",
            RunnerState::ControllersStopping => "controllers_stopping",
            RunnerState::ServicesStopping => "services_stopping",
            RunnerState::Terminated => "terminated",
            RunnerState::Failed => "failed",
        }
    }
}

impl fmt::Display for RunnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ready_covers_ready_and_later_but_not_failed() {
        assert!(!RunnerState::Building.is_ready());
        assert!(!RunnerState::UiStarting.is_ready());
        assert!(RunnerState::Ready.is_ready());
        assert!(RunnerState::ServicesStopping.is_ready());
        assert!(RunnerState::Terminated.is_ready());
        assert!(!RunnerState::Failed.is_ready());
    }

    #[test]
    fn test_final_states() {
        assert!(RunnerState::Terminated.is_final());
        assert!(RunnerState::Failed.is_final());
        assert!(!RunnerState::Running.is_final());
    }
}
