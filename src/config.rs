//! # Runner configuration.
//!
//! Provides [`Config`], the settings a [`Runner`](crate::Runner) is built from.
//!
//! Config is used in two ways:
//! 1. **Runner creation**: `Runner::builder(config).build()`
//! 2. **Logging setup**: `runvisor::logging::init(&config)` (feature `logging`)

/// Global configuration for the runner.
///
/// ## Field semantics
/// - `project_name` / `version`: logged once when the runner is built
/// - `log_level`: fallback filter directive when `RUST_LOG` is unset
/// - `handle_os_signals`: install SIGINT/SIGTERM/SIGQUIT handlers in `run`
#[derive(Clone, Debug)]
pub struct Config {
    /// Name of the application; attached to the runner's log records.
    pub project_name: String,

    /// Application version, logged next to the project name.
    pub version: String,

    /// Default log filter (e.g. `"info"`, `"runvisor=debug,info"`).
    ///
    /// Only consulted when `RUST_LOG` is not set.
    pub log_level: String,

    /// Whether `run` translates OS termination signals into shutdown.
    ///
    /// Disable when embedding the runner in a process that owns signal
    /// handling itself, or in tests that drive shutdown through `kill`.
    pub handle_os_signals: bool,
}

impl Config {
    /// Creates a configuration for `project_name` at `version` with defaults for the rest.
    pub fn new(project_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            version: version.into(),
            ..Self::default()
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `project_name = "app"`
    /// - `version = CARGO_PKG_VERSION` of this crate
    /// - `log_level = "info"`
    /// - `handle_os_signals = true`
    fn default() -> Self {
        Self {
            project_name: "app".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            handle_os_signals: true,
        }
    }
}
