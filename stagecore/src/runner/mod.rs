//! Single-stage runner.
//!
//! Wires one stage attempt the way a driver does: build the executor (fail
//! fast on unknown kinds), run it on its own task against a stop signal,
//! fire `Timeout` when the deadline passes, give the executor a grace
//! period once the signal fires, and resolve the final status.

mod config;

pub use config::RunnerConfig;

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn, Instrument, Span};
use uuid::Uuid;

use crate::cancellation::{StopSignalHandler, StopSignalKind};
use crate::core::StageStatus;
use crate::errors::RegistryError;
use crate::executor::{determine_stage_status, ExecutorInput, ExecutorRegistry};
use crate::observability::StageSpanAttributes;
use crate::ports::LogPersister;

/// Outcome of one stage attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRunReport {
    /// ID of the attempt, for correlating logs.
    pub attempt_id: Uuid,
    /// The resolved status to persist.
    pub status: StageStatus,
    /// What the executor itself reported.
    pub computed: StageStatus,
    /// The stop signal at the end of the attempt.
    pub signal: StopSignalKind,
    /// Whether the executor was aborted after the grace period.
    pub abandoned: bool,
    /// How long the attempt took.
    pub elapsed: Duration,
}

/// Runs one stage attempt at a time.
#[derive(Debug)]
pub struct StageRunner<'a> {
    registry: &'a ExecutorRegistry,
    config: RunnerConfig,
}

impl<'a> StageRunner<'a> {
    /// Creates a runner over a composed registry.
    #[must_use]
    pub fn new(registry: &'a ExecutorRegistry, config: RunnerConfig) -> Self {
        Self { registry, config }
    }

    /// Returns the runner configuration.
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs the stage described by `input` until it completes or is stopped.
    ///
    /// The executor kind is the stage configuration name and the prior
    /// status is the one recorded on the stage. `handler` must be fresh;
    /// the caller keeps clones of it to terminate or cancel the attempt.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` before anything runs if the stage
    /// kind has no executor.
    pub async fn run(
        &self,
        input: ExecutorInput,
        handler: StopSignalHandler,
    ) -> Result<StageRunReport, RegistryError> {
        let kind = input.stage_config.name.clone();
        let prior = input.stage.status;
        let log = input.log_persister.clone();
        let span = input.logger.clone();
        let deadline = self.config.deadline_for(input.stage_config.timeout());
        let attributes =
            StageSpanAttributes::new(&input.deployment.id, &input.stage.id, &kind);

        let executor = self.registry.executor(&kind, input)?;

        let attempt_id = Uuid::new_v4();
        let started = Instant::now();
        info!(parent: &span, %attempt_id, stage_kind = %kind, ?deadline, "Starting stage attempt");

        let signal = handler.signal();
        let mut task = {
            let signal = signal.clone();
            tokio::spawn(async move { executor.execute(signal).await }.instrument(span.clone()))
        };
        let timer = deadline.map(|d| spawn_deadline_timer(d, handler.clone(), span.clone()));

        let finished = tokio::select! {
            joined = &mut task => Some(joined),
            kind = signal.wait() => {
                info!(parent: &span, signal = %kind, "Stop signal received, waiting for executor");
                log.append_info(&format!("Stage received {kind} signal"));
                None
            }
        };

        let (computed, abandoned) = match finished {
            Some(joined) => (computed_status(joined, log.as_ref(), &span), false),
            None => match tokio::time::timeout(self.config.grace_period, &mut task).await {
                Ok(joined) => (computed_status(joined, log.as_ref(), &span), false),
                Err(_) => {
                    task.abort();
                    warn!(
                        parent: &span,
                        grace_period = ?self.config.grace_period,
                        "Executor ignored the stop signal, abandoning it"
                    );
                    log.append_error(&format!(
                        "Stage did not stop within {:?} and was abandoned",
                        self.config.grace_period
                    ));
                    (StageStatus::Failure, true)
                }
            },
        };

        if let Some(timer) = timer {
            timer.abort();
        }

        let signal_kind = signal.kind();
        let status = determine_stage_status(signal_kind, prior, computed);
        let report = StageRunReport {
            attempt_id,
            status,
            computed,
            signal: signal_kind,
            abandoned,
            elapsed: started.elapsed(),
        };
        let attributes = attributes.with_report(&report).to_otel_attributes();
        info!(parent: &span, %computed, ?attributes, "Stage attempt finished");

        Ok(report)
    }
}

/// Fires `Timeout` once `deadline` elapses, unless the signal fired first.
fn spawn_deadline_timer(
    deadline: Duration,
    handler: StopSignalHandler,
    span: Span,
) -> JoinHandle<()> {
    let signal = handler.signal();
    tokio::spawn(
        async move {
            tokio::select! {
                () = tokio::time::sleep(deadline) => {
                    if handler.timeout() {
                        warn!(?deadline, "Stage deadline exceeded");
                    }
                }
                _ = signal.wait() => {}
            }
        }
        .instrument(span),
    )
}

/// Maps the joined executor task to the status it computed.
fn computed_status(
    joined: Result<StageStatus, JoinError>,
    log: &dyn LogPersister,
    span: &Span,
) -> StageStatus {
    match joined {
        Ok(status) if status.is_completed() => status,
        Ok(status) => {
            error!(parent: span, %status, "Executor returned a non-final status");
            log.append_error(&format!("Stage finished with unexpected status {status}"));
            StageStatus::Failure
        }
        Err(err) => {
            error!(parent: span, error = %err, "Executor task failed");
            log.append_error(&format!("Stage execution crashed: {err}"));
            StageStatus::Failure
        }
    }
}
