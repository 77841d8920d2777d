//! Executor contract and the pieces the driver needs around it.
//!
//! An executor runs the logic of one stage kind. It is built by a factory
//! from an [`ExecutorInput`], runs against a [`StopSignal`] and reports a
//! completed [`StageStatus`]. There is no error channel: every internal
//! failure becomes `StageStatus::Failure` plus a line in the stage log.

mod input;
mod registry;
mod resolve;

pub use input::ExecutorInput;
pub use registry::{ExecutorFactory, ExecutorRegistry};
pub use resolve::{determine_stage_status, determine_stage_status_raw};

use crate::cancellation::StopSignal;
use crate::core::StageStatus;
use crate::errors::ExecutorError;
use crate::ports::LogPersister;
use async_trait::async_trait;

/// The runnable behavior bound to one stage kind.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Runs the stage until it completes or the signal fires.
    ///
    /// Must return a completed status, and must return promptly once
    /// `sig` is terminal, including when it already is at call time.
    async fn execute(&self, sig: StopSignal) -> StageStatus;
}

/// Logs an internal error and returns `StageStatus::Failure`.
pub fn report_failure(log: &dyn LogPersister, err: &ExecutorError) -> StageStatus {
    log.append_error(&err.to_string());
    StageStatus::Failure
}

/// Converts the result of an executor body into a status.
///
/// Lets executor bodies use `?` on collaborator calls while keeping the
/// status-only contract at the boundary.
pub fn status_from_result(
    result: Result<StageStatus, ExecutorError>,
    log: &dyn LogPersister,
) -> StageStatus {
    match result {
        Ok(status) => status,
        Err(err) => report_failure(log, &err),
    }
}
