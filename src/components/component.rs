//! # Component capability traits.
//!
//! A component participates in the runner by implementing [`Component`] and
//! one of the category markers [`Service`] or [`Controller`]. The runner only
//! ever calls `start`, `stop` and `health` and expects them to return promptly;
//! long-running work belongs to a background task the component spawns and
//! owns itself.
//!
//! Components are shared as `Arc<dyn Service>` / `Arc<dyn Controller>`, so all
//! methods take `&self` and mutable state lives behind interior mutability.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ComponentError;

/// # Base lifecycle contract.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use runvisor::{Component, ComponentError, Service};
///
/// struct Cache;
///
/// #[async_trait]
/// impl Component for Cache {
///     fn name(&self) -> &str { "cache" }
///
///     async fn start(&self) -> Result<(), ComponentError> { Ok(()) }
///     async fn stop(&self) -> Result<(), ComponentError> { Ok(()) }
///     async fn health(&self) -> Result<(), ComponentError> { Ok(()) }
/// }
///
/// impl Service for Cache {}
/// ```
#[async_trait]
pub trait Component: Send + Sync + 'static {
    /// Returns the registration name; must be non-empty and unique within its category.
    fn name(&self) -> &str;

    /// Starts the component. Called exactly once, before any dependent component.
    async fn start(&self) -> Result<(), ComponentError>;

    /// Stops the component and releases its resources.
    async fn stop(&self) -> Result<(), ComponentError>;

    /// Reports whether the component is currently healthy.
    async fn health(&self) -> Result<(), ComponentError>;
}

/// Background dependency, started first and stopped last.
pub trait Service: Component {}

/// Request-facing component, started after every service.
pub trait Controller: Component {}

/// # Controller owning the foreground loop.
///
/// At most one may be registered. It is started after all other controllers
/// and stopped before them. Between the two the runner hands it the
/// termination token and waits for [`run`](UiController::run) to return.
#[async_trait]
pub trait UiController: Controller {
    /// Runs the foreground loop.
    ///
    /// Must return once `termination` is cancelled. Returning earlier (the user
    /// quit the UI) begins the shutdown sequence as well.
    async fn run(&self, termination: CancellationToken) -> Result<(), ComponentError>;
}
