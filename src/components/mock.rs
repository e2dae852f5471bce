//! # Configurable mock components.
//!
//! [`MockService`], [`MockController`] and [`MockUiController`] implement the
//! capability traits with overridable behavior and call counters. Attach a
//! shared [`CallLog`] to observe the order in which the runner drives them.
//!
//! ```
//! use runvisor::mock::{CallLog, MockService};
//!
//! let log = CallLog::new();
//! let db = MockService::new("db").with_log(log.clone());
//! assert_eq!(db.start_calls(), 0);
//! assert!(log.entries().is_empty());
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{Component, Controller, Service, UiController};
use crate::error::ComponentError;

type Behavior = Box<dyn Fn() -> Result<(), ComponentError> + Send + Sync>;

/// Ordered record of lifecycle calls shared between several mocks.
///
/// Entries look like `"start:db"`, `"stop:api"`, `"run:tui"`.
#[derive(Clone, Default, Debug)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `"{op}:{name}"`.
    pub fn record(&self, op: &str, name: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("{op}:{name}"));
    }

    /// Returns a copy of all entries in call order.
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the names recorded for one operation, in call order.
    pub fn names_for(&self, op: &str) -> Vec<String> {
        let prefix = format!("{op}:");
        self.entries()
            .into_iter()
            .filter_map(|e| e.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }
}

/// Shared state behind every mock flavor.
struct MockCore {
    name: String,
    start: Behavior,
    stop: Behavior,
    health: Behavior,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    health_calls: AtomicUsize,
    log: Option<CallLog>,
}

impl MockCore {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            start: Box::new(|| Ok(())),
            stop: Box::new(|| Ok(())),
            health: Box::new(|| Ok(())),
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            health_calls: AtomicUsize::new(0),
            log: None,
        }
    }

    fn call(&self, op: &str, counter: &AtomicUsize, behavior: &Behavior) -> Result<(), ComponentError> {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.record(op, &self.name);
        }
        behavior()
    }
}

macro_rules! mock_component {
    ($ty:ident) => {
        impl $ty {
            /// Attaches a shared call log.
            pub fn with_log(mut self, log: CallLog) -> Self {
                self.core.log = Some(log);
                self
            }

            /// Overrides the result of `start`.
            pub fn on_start<F>(mut self, f: F) -> Self
            where
                F: Fn() -> Result<(), ComponentError> + Send + Sync + 'static,
            {
                self.core.start = Box::new(f);
                self
            }

            /// Overrides the result of `stop`.
            pub fn on_stop<F>(mut self, f: F) -> Self
            where
                F: Fn() -> Result<(), ComponentError> + Send + Sync + 'static,
            {
                self.core.stop = Box::new(f);
                self
            }

            /// Overrides the result of `health`.
            pub fn on_health<F>(mut self, f: F) -> Self
            where
                F: Fn() -> Result<(), ComponentError> + Send + Sync + 'static,
            {
                self.core.health = Box::new(f);
                self
            }

            /// Number of `start` calls so far.
            pub fn start_calls(&self) -> usize {
                self.core.start_calls.load(Ordering::SeqCst)
            }

            /// Number of `stop` calls so far.
            pub fn stop_calls(&self) -> usize {
                self.core.stop_calls.load(Ordering::SeqCst)
            }

            /// Number of `health` calls so far.
            pub fn health_calls(&self) -> usize {
                self.core.health_calls.load(Ordering::SeqCst)
            }
        }

        #[async_trait]
        impl Component for $ty {
            fn name(&self) -> &str {
                &self.core.name
            }

            async fn start(&self) -> Result<(), ComponentError> {
                self.core.call("start", &self.core.start_calls, &self.core.start)
            }

            async fn stop(&self) -> Result<(), ComponentError> {
                self.core.call("stop", &self.core.stop_calls, &self.core.stop)
            }

            async fn health(&self) -> Result<(), ComponentError> {
                self.core.call("health", &self.core.health_calls, &self.core.health)
            }
        }
    };
}

/// Mock [`Service`].
pub struct MockService {
    core: MockCore,
}

impl MockService {
    /// Creates a mock whose operations all succeed.
    pub fn new(name: &str) -> Self {
        Self {
            core: MockCore::new(name),
        }
    }
}

mock_component!(MockService);
impl Service for MockService {}

/// Mock [`Controller`].
pub struct MockController {
    core: MockCore,
}

impl MockController {
    /// Creates a mock whose operations all succeed.
    pub fn new(name: &str) -> Self {
        Self {
            core: MockCore::new(name),
        }
    }
}

mock_component!(MockController);
impl Controller for MockController {}

/// Mock [`UiController`].
///
/// By default `run` waits for the termination token. [`exit_with`](Self::exit_with)
/// makes it return immediately instead, as a UI whose user quit would.
pub struct MockUiController {
    core: MockCore,
    exit: Option<Result<(), ComponentError>>,
    run_calls: AtomicUsize,
}

impl MockUiController {
    /// Creates a mock that runs until terminated.
    pub fn new(name: &str) -> Self {
        Self {
            core: MockCore::new(name),
            exit: None,
            run_calls: AtomicUsize::new(0),
        }
    }

    /// Makes `run` return `result` without waiting for termination.
    pub fn exit_with(mut self, result: Result<(), ComponentError>) -> Self {
        self.exit = Some(result);
        self
    }

    /// Number of `run` calls so far.
    pub fn run_calls(&self) -> usize {
        self.run_calls.load(Ordering::SeqCst)
    }
}

mock_component!(MockUiController);
impl Controller for MockUiController {}

#[async_trait]
impl UiController for MockUiController {
    async fn run(&self, termination: CancellationToken) -> Result<(), ComponentError> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.core.log {
            log.record("run", &self.core.name);
        }
        match &self.exit {
            Some(result) => result.clone(),
            None => {
                termination.cancelled().await;
                Ok(())
            }
        }
    }
}
