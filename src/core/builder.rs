use std::sync::Arc;

use super::{
    fatal::{ExitProcess, FatalPolicy},
    runner::Runner,
};
use crate::config::Config;

/// Builder for constructing a [`Runner`] with a custom fatal policy.
pub struct RunnerBuilder {
    cfg: Config,
    fatal: Arc<dyn FatalPolicy>,
}

impl RunnerBuilder {
    /// Creates a new builder with the given configuration and the
    /// [`ExitProcess`] policy.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            fatal: Arc::new(ExitProcess),
        }
    }

    /// Replaces the policy applied to boot-time errors.
    ///
    /// The same policy instance is shared by the runner and its context.
    pub fn with_fatal_policy<P: FatalPolicy>(mut self, policy: P) -> Self {
        self.fatal = Arc::new(policy);
        self
    }

    /// Builds the runner in the `Building` state.
    pub fn build(self) -> Runner {
        Runner::new_internal(self.cfg, self.fatal)
    }
}
