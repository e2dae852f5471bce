//! # runvisor
//!
//! **Runvisor** is a minimal application-lifecycle runner for Rust.
//!
//! It wires named components (services, controllers and an optional
//! UI-controller) through a dependency-injection registry, starts them in a
//! deterministic order, waits for termination, and stops them in exact reverse
//! order. A generic last-value [`Broadcaster`] is used for lifecycle state
//! observation and is available to components as well.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   factory    │   │   factory    │   │   factory    │
//!     │  (service)   │   │ (controller) │   │(ui-controller│
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Runner                                                           │
//! │  - Context (name → component, typed lookup for later factories)   │
//! │  - services_order / controllers_order (creation order)            │
//! │  - CancellationToken (kill / OS signal / ui-controller exit)      │
//! │  - Broadcaster<RunnerState> (ready signal, state observers)       │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   start services ──► start controllers ──► start ui ──► Ready
//!                                                          │
//!                      ui.run(termination) or termination.cancelled()
//!                                                          │
//!   stop services  ◄── stop controllers  ◄── stop ui  ◄────┘
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Components**    | Capability contracts the runner drives.                      | [`Service`], [`Controller`], [`UiController`] |
//! | **Registry**      | Name-keyed dependency lookup for factories.                  | [`Context`]                                 |
//! | **Lifecycle**     | Ordered start, termination, reverse-order stop.              | [`Runner`], [`RunnerHandle`], [`RunnerState`] |
//! | **Broadcasting**  | Last-value pub/sub with bounded per-subscriber delivery.     | [`Broadcaster`], [`Subscription`]           |
//! | **Errors**        | Typed boot-time and component errors; pluggable fatal policy.| [`RuntimeError`], [`FatalPolicy`]           |
//! | **Configuration** | Project identity, log level, signal handling.                | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging` (default): exports [`logging::init`], a `tracing-subscriber` setup.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use runvisor::{Component, ComponentError, Config, Controller, Runner, Service};
//!
//! struct Db;
//!
//! #[async_trait]
//! impl Component for Db {
//!     fn name(&self) -> &str { "db" }
//!     async fn start(&self) -> Result<(), ComponentError> { Ok(()) }
//!     async fn stop(&self) -> Result<(), ComponentError> { Ok(()) }
//!     async fn health(&self) -> Result<(), ComponentError> { Ok(()) }
//! }
//! impl Service for Db {}
//!
//! struct Api { db: Arc<Db> }
//!
//! #[async_trait]
//! impl Component for Api {
//!     fn name(&self) -> &str { "api" }
//!     async fn start(&self) -> Result<(), ComponentError> { Ok(()) }
//!     async fn stop(&self) -> Result<(), ComponentError> { Ok(()) }
//!     async fn health(&self) -> Result<(), ComponentError> { self.db.health().await }
//! }
//! impl Controller for Api {}
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::new("example", "1.0.0");
//!     cfg.handle_os_signals = false;
//!
//!     let mut runner = Runner::new(cfg);
//!     runner.create_service(|_| Ok(Db))?;
//!     runner.create_controller(|ctx| Ok(Api { db: ctx.service("db")? }))?;
//!
//!     let handle = runner.handle();
//!     let run = tokio::spawn(runner.run());
//!
//!     handle.await_ready().await;
//!     handle.kill();
//!
//!     let report = run.await??;
//!     assert!(report.is_clean());
//!     Ok(())
//! }
//! ```
mod broadcaster;
mod components;
mod config;
mod core;
mod error;

#[cfg(feature = "logging")]
pub mod logging;

// ---- Public re-exports ----

pub use broadcaster::{Broadcaster, SubscriberId, Subscription};
pub use components::{Component, ComponentKind, Controller, Service, UiController, mock};
pub use config::Config;
pub use crate::core::{
    Context, ExitProcess, FatalPolicy, RecordFatal, Runner, RunnerBuilder, RunnerHandle,
    RunnerState, ShutdownReport, StopFailure,
};
pub use error::{ComponentError, RegistryError, RuntimeError};
