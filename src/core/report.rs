use crate::components::ComponentKind;
use crate::error::ComponentError;

/// A component whose `stop` call failed during shutdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StopFailure {
    /// Category of the component.
    pub kind: ComponentKind,
    /// Name of the component.
    pub name: String,
    /// Error returned by `stop` (or the panic message).
    pub error: ComponentError,
}

/// Outcome of a completed shutdown sequence.
///
/// Stop failures never abort shutdown; they are collected here in the order
/// they happened.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Failed `stop` calls.
    pub failures: Vec<StopFailure>,
    /// Error returned by the UI-controller's `run`, if any.
    pub ui_run_error: Option<ComponentError>,
}

impl ShutdownReport {
    /// True when every component stopped cleanly.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.ui_run_error.is_none()
    }
}
