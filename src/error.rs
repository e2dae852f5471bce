//! Error types used by the runvisor runtime and its components.
//!
//! This module defines three error enums:
//!
//! - [`ComponentError`] — errors returned by a component's own lifecycle calls.
//! - [`RegistryError`] — wiring errors raised by the [`Context`](crate::Context).
//! - [`RuntimeError`] — boot-time errors raised by the [`Runner`](crate::Runner).
//!
//! All types provide `as_label` (stable snake_case label for logs) and
//! `as_message` helpers.

use thiserror::Error;

use crate::components::ComponentKind;

/// # Errors returned by components.
///
/// Returned from `start`, `stop`, `health` and `UiController::run`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// The operation failed.
    #[error("component failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The component is running but reports itself as not healthy.
    #[error("component unhealthy: {error}")]
    Unhealthy {
        /// The reason reported by the component.
        error: String,
    },
}

impl ComponentError {
    /// Builds a [`ComponentError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use runvisor::ComponentError;
    ///
    /// let err = ComponentError::fail("connection refused");
    /// assert_eq!(err.to_string(), "component failed: connection refused");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        ComponentError::Fail {
            error: error.to_string(),
        }
    }

    /// Builds a [`ComponentError::Unhealthy`] from anything printable.
    pub fn unhealthy(error: impl std::fmt::Display) -> Self {
        ComponentError::Unhealthy {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ComponentError::Fail { .. } => "component_failed",
            ComponentError::Unhealthy { .. } => "component_unhealthy",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ComponentError::Fail { error } => format!("error: {error}"),
            ComponentError::Unhealthy { error } => format!("unhealthy: {error}"),
        }
    }
}

/// # Errors produced while wiring the registry.
///
/// Every variant is a boot-time invariant violation: it is handed to the
/// configured [`FatalPolicy`](crate::FatalPolicy) before being returned.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A component reported an empty name.
    #[error("cannot register {kind}: empty name")]
    EmptyName {
        /// Category the component was registered under.
        kind: ComponentKind,
    },

    /// A component with the same name is already registered in this category.
    #[error("cannot register {kind} '{name}': name already in use")]
    DuplicateName {
        /// Category the component was registered under.
        kind: ComponentKind,
        /// The conflicting name.
        name: String,
    },

    /// A UI-controller is already registered; at most one is allowed.
    #[error("cannot register ui-controller '{name}': '{existing}' is already registered")]
    UiControllerAlreadySet {
        /// Name of the rejected UI-controller.
        name: String,
        /// Name of the UI-controller already registered.
        existing: String,
    },

    /// No component with that name is registered.
    #[error("cannot get {kind} '{name}': unknown {kind}")]
    NotFound {
        /// Category that was searched.
        kind: ComponentKind,
        /// The requested name.
        name: String,
    },

    /// The component exists but is not of the requested concrete type.
    #[error("cannot get {kind} '{name}': registered instance is not a {expected}")]
    TypeMismatch {
        /// Category that was searched.
        kind: ComponentKind,
        /// The requested name.
        name: String,
        /// Type name the caller asked for.
        expected: &'static str,
    },
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::EmptyName { .. } => "registry_empty_name",
            RegistryError::DuplicateName { .. } => "registry_duplicate_name",
            RegistryError::UiControllerAlreadySet { .. } => "registry_ui_controller_already_set",
            RegistryError::NotFound { .. } => "registry_not_found",
            RegistryError::TypeMismatch { .. } => "registry_type_mismatch",
        }
    }
}

/// # Boot-time errors produced by the runner.
///
/// These abort startup. Under the default [`ExitProcess`](crate::ExitProcess)
/// policy the process exits before the error is ever returned.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// Wiring the registry failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A factory could not build its component.
    #[error("cannot create {kind}: {error}")]
    Factory {
        /// Category of the component being built.
        kind: ComponentKind,
        /// Error returned by the factory.
        error: ComponentError,
    },

    /// A component failed to start.
    #[error("cannot start {kind} '{name}': {error}")]
    StartFailed {
        /// Category of the component.
        kind: ComponentKind,
        /// Name of the component.
        name: String,
        /// Error returned by `start`.
        error: ComponentError,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use runvisor::{ComponentError, ComponentKind, RuntimeError};
    ///
    /// let err = RuntimeError::StartFailed {
    ///     kind: ComponentKind::Service,
    ///     name: "db".into(),
    ///     error: ComponentError::fail("refused"),
    /// };
    /// assert_eq!(err.as_label(), "runtime_start_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Registry(e) => e.as_label(),
            RuntimeError::Factory { .. } => "runtime_factory_failed",
            RuntimeError::StartFailed { .. } => "runtime_start_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::Registry(e) => e.to_string(),
            RuntimeError::Factory { kind, error } => {
                format!("factory for {kind} failed; {}", error.as_message())
            }
            RuntimeError::StartFailed { kind, name, error } => {
                format!("{kind} '{name}' did not start; {}", error.as_message())
            }
        }
    }
}
