//! Per-run context.
//!
//! The seed and the log destination of a run travel with the run instead of
//! living in process-wide state, so several runs can share a process.
//!
//! No stage draws random numbers: cleaning, cohort construction and the
//! fits are deterministic. The effective seed is recorded in
//! `run_metadata.json` so a run can be matched to its configuration.

use tracing::Dispatch;

/// Explicit inputs of a run besides its configuration files.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    seed_override: Option<u64>,
    dispatch: Option<Dispatch>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `seed` instead of `project.seed`.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_override = Some(seed);
        self
    }

    /// Route the run's events to `dispatch` instead of the current default subscriber.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    pub fn seed_override(&self) -> Option<u64> {
        self.seed_override
    }

    /// The override when set, otherwise the configured seed.
    pub fn effective_seed(&self, configured: u64) -> u64 {
        self.seed_override.unwrap_or(configured)
    }

    /// Run `f` with this context's subscriber as the thread default.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}
