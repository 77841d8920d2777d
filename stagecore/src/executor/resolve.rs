//! Resolution of the final stage status.

use crate::cancellation::StopSignalKind;
use crate::core::StageStatus;

/// Combines the stop signal with what the executor computed.
///
/// - `None`: the run finished on its own, so the computed status stands.
/// - `Terminate`: the agent is shutting down and the real outcome is
///   unknown; keep the status recorded before this attempt so a later
///   attempt can resume.
/// - `Cancel`: an explicit cancellation wins over any computed status,
///   `Success` included.
/// - `Timeout`: a stage that exceeded its deadline failed.
#[must_use]
pub fn determine_stage_status(
    sig: StopSignalKind,
    ori: StageStatus,
    got: StageStatus,
) -> StageStatus {
    match sig {
        StopSignalKind::None => got,
        StopSignalKind::Terminate => ori,
        StopSignalKind::Cancel => StageStatus::Cancelled,
        StopSignalKind::Timeout => StageStatus::Failure,
    }
}

/// Same as [`determine_stage_status`] for a raw signal kind, e.g. one read
/// back from an attempt record.
///
/// Unrecognized kinds resolve to `Failure`.
#[must_use]
pub fn determine_stage_status_raw(sig: u8, ori: StageStatus, got: StageStatus) -> StageStatus {
    StopSignalKind::try_from(sig).map_or(StageStatus::Failure, |kind| {
        determine_stage_status(kind, ori, got)
    })
}
