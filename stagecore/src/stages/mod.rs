//! Built-in stage executors.
//!
//! This module provides:
//! - WaitExecutor, a resumable, interruptible wait
//! - ApprovalExecutor, which waits for an approval command

mod approval;
mod wait;

pub use approval::ApprovalExecutor;
pub use wait::{WaitExecutor, WAIT_START_TIME_KEY};

use crate::cancellation::StopSignalKind;
use crate::core::StageStatus;

/// Status an interrupted executor reports; the resolver decides the rest.
fn interrupted_status(kind: StopSignalKind) -> StageStatus {
    match kind {
        StopSignalKind::Cancel => StageStatus::Cancelled,
        _ => StageStatus::Failure,
    }
}
