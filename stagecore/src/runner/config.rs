//! Runner configuration.

use std::time::Duration;

/// Driver policy for one stage attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Deadline applied when the stage configuration sets none.
    ///
    /// A zero duration means no deadline.
    pub stage_timeout: Option<Duration>,
    /// How long an executor may keep running after the stop signal fired
    /// before it is abandoned.
    pub grace_period: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            stage_timeout: None,
            grace_period: Duration::from_secs(10),
        }
    }
}

impl RunnerConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default stage deadline.
    #[must_use]
    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = Some(timeout);
        self
    }

    /// Sets the grace period.
    #[must_use]
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Returns the deadline for a stage, preferring its own configuration.
    ///
    /// Zero durations are ignored, so they never expire an attempt at once.
    #[must_use]
    pub fn deadline_for(&self, stage_timeout: Option<Duration>) -> Option<Duration> {
        stage_timeout
            .filter(|d| !d.is_zero())
            .or(self.stage_timeout.filter(|d| !d.is_zero()))
    }
}
