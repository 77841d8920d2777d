//! Stage status and log severity enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The recorded status of a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Stage has not been started by the driver yet.
    NotStartedYet,
    /// Stage is currently running.
    Running,
    /// Stage completed successfully.
    Success,
    /// Stage failed.
    Failure,
    /// Stage was cancelled by an explicit request.
    Cancelled,
    /// Stage was skipped.
    Skipped,
    /// Stage exited early without finishing its work, e.g. a rollback
    /// that found nothing to roll back.
    Exited,
}

impl Default for StageStatus {
    fn default() -> Self {
        Self::NotStartedYet
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStartedYet => write!(f, "not_started_yet"),
            Self::Running => write!(f, "running"),
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Skipped => write!(f, "skipped"),
            Self::Exited => write!(f, "exited"),
        }
    }
}

impl StageStatus {
    /// Returns true if the status is a final outcome of an attempt.
    ///
    /// Executors must only ever return completed statuses.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        !matches!(self, Self::NotStartedYet | Self::Running)
    }

    /// Returns true if the status indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::Skipped | Self::Exited)
    }

    /// Returns true if the status indicates failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure | Self::Cancelled)
    }
}

/// Severity of a stage log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSeverity {
    /// Informational progress line.
    Info,
    /// A step finished successfully.
    Success,
    /// Something went wrong.
    Error,
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_status_display() {
        assert_eq!(StageStatus::NotStartedYet.to_string(), "not_started_yet");
        assert_eq!(StageStatus::Success.to_string(), "success");
        assert_eq!(StageStatus::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn test_stage_status_is_completed() {
        assert!(StageStatus::Success.is_completed());
        assert!(StageStatus::Failure.is_completed());
        assert!(StageStatus::Cancelled.is_completed());
        assert!(StageStatus::Skipped.is_completed());
        assert!(StageStatus::Exited.is_completed());
        assert!(!StageStatus::NotStartedYet.is_completed());
        assert!(!StageStatus::Running.is_completed());
    }

    #[test]
    fn test_stage_status_default() {
        assert_eq!(StageStatus::default(), StageStatus::NotStartedYet);
    }

    #[test]
    fn test_stage_status_serialize() {
        let json = serde_json::to_string(&StageStatus::NotStartedYet).unwrap();
        assert_eq!(json, r#""not_started_yet""#);

        let deserialized: StageStatus = serde_json::from_str(r#""cancelled""#).unwrap();
        assert_eq!(deserialized, StageStatus::Cancelled);
    }

    #[test]
    fn test_log_severity_display() {
        assert_eq!(LogSeverity::Info.to_string(), "info");
        assert_eq!(LogSeverity::Error.to_string(), "error");
    }
}
