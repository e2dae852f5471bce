//! Runtime core: registry, orchestration and lifecycle.
//!
//! The public API from this module is [`Runner`] (with [`RunnerBuilder`] and
//! [`RunnerHandle`]), the [`Context`] registry, and the [`FatalPolicy`] seam.
//!
//! Internal modules:
//! - [`context`]: name-keyed component registry used by factories;
//! - [`runner`]: ordered start, termination wait, reverse-order stop;
//! - [`handle`]: readiness, kill and state observation while `run` is pending;
//! - [`fatal`]: what a boot-time invariant violation does;
//! - [`shutdown`]: OS signals translated into termination.

mod builder;
mod context;
mod fatal;
mod handle;
mod report;
mod runner;
mod shutdown;
mod state;

pub use builder::RunnerBuilder;
pub use context::Context;
pub use fatal::{ExitProcess, FatalPolicy, RecordFatal};
pub use handle::RunnerHandle;
pub use report::{ShutdownReport, StopFailure};
pub use runner::Runner;
pub use state::RunnerState;
