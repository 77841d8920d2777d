//! Span attributes describing a stage attempt.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::runner::StageRunReport;

/// Attributes of one stage attempt, keyed the way exporters expect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageSpanAttributes {
    /// Deployment ID.
    pub deployment_id: String,
    /// Stage ID.
    pub stage_id: String,
    /// Stage kind.
    pub stage_kind: String,
    /// Attempt ID.
    pub attempt_id: Option<String>,
    /// Resolved status.
    pub status: Option<String>,
    /// Stop signal at the end of the attempt.
    pub signal: Option<String>,
    /// Duration in milliseconds.
    pub duration_ms: Option<f64>,
    /// Whether the executor was abandoned.
    pub abandoned: bool,
}

impl StageSpanAttributes {
    /// Creates attributes for a stage.
    #[must_use]
    pub fn new(
        deployment_id: impl Into<String>,
        stage_id: impl Into<String>,
        stage_kind: impl Into<String>,
    ) -> Self {
        Self {
            deployment_id: deployment_id.into(),
            stage_id: stage_id.into(),
            stage_kind: stage_kind.into(),
            ..Self::default()
        }
    }

    /// Fills in the outcome of an attempt.
    #[must_use]
    pub fn with_report(mut self, report: &StageRunReport) -> Self {
        self.attempt_id = Some(report.attempt_id.to_string());
        self.status = Some(report.status.to_string());
        self.signal = Some(report.signal.to_string());
        self.duration_ms = Some(report.elapsed.as_secs_f64() * 1000.0);
        self.abandoned = report.abandoned;
        self
    }

    /// Converts to OpenTelemetry-style attributes.
    #[must_use]
    pub fn to_otel_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();
        attrs.insert("deployment.id".to_string(), self.deployment_id.clone());
        attrs.insert("stage.id".to_string(), self.stage_id.clone());
        attrs.insert("stage.kind".to_string(), self.stage_kind.clone());

        if let Some(ref v) = self.attempt_id {
            attrs.insert("stage.attempt_id".to_string(), v.clone());
        }
        if let Some(ref v) = self.status {
            attrs.insert("stage.status".to_string(), v.clone());
        }
        if let Some(ref v) = self.signal {
            attrs.insert("stage.stop_signal".to_string(), v.clone());
        }
        if let Some(v) = self.duration_ms {
            attrs.insert("stage.duration_ms".to_string(), v.to_string());
        }
        if self.abandoned {
            attrs.insert("stage.abandoned".to_string(), "true".to_string());
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::StopSignalKind;
    use crate::core::StageStatus;
    use std::time::Duration;
    use uuid::Uuid;

    #[test]
    fn test_attributes_without_report() {
        let attrs = StageSpanAttributes::new("dep-1", "stage-1", "WAIT").to_otel_attributes();

        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs.get("stage.kind"), Some(&"WAIT".to_string()));
    }

    #[test]
    fn test_attributes_with_report() {
        let report = StageRunReport {
            attempt_id: Uuid::nil(),
            status: StageStatus::Cancelled,
            computed: StageStatus::Success,
            signal: StopSignalKind::Cancel,
            abandoned: true,
            elapsed: Duration::from_millis(250),
        };

        let attrs = StageSpanAttributes::new("dep-1", "stage-1", "WAIT")
            .with_report(&report)
            .to_otel_attributes();

        assert_eq!(attrs.get("stage.status"), Some(&"cancelled".to_string()));
        assert_eq!(attrs.get("stage.stop_signal"), Some(&"cancel".to_string()));
        assert_eq!(attrs.get("stage.duration_ms"), Some(&"250".to_string()));
        assert_eq!(attrs.get("stage.abandoned"), Some(&"true".to_string()));
    }
}
