//! # Logging setup.
//!
//! The runtime logs through [`tracing`]. [`init`] installs a fmt subscriber
//! filtered by `RUST_LOG`, falling back to [`Config::log_level`].
//!
//! ## Example output
//! ```text
//! INFO runvisor::core::runner: example 1.0.0 project="example"
//! INFO runvisor::core::runner: starting service component="db"
//! INFO runvisor::core::runner: service started component="db"
//! INFO runvisor::core::runner: stopping ...
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Installs the global tracing subscriber.
///
/// Returns `false` if a global subscriber was already set (the existing one is kept).
pub fn init(cfg: &Config) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
