//! Resumable wait stage.

use async_trait::async_trait;
use std::time::Duration;
use tracing::Instrument;

use super::interrupted_status;
use crate::cancellation::StopSignal;
use crate::core::StageStatus;
use crate::errors::ExecutorError;
use crate::executor::{status_from_result, Executor, ExecutorInput};

/// Stage metadata key holding the wait start time, in Unix milliseconds.
pub const WAIT_START_TIME_KEY: &str = "start-time";

/// An executor that waits for a configured duration.
///
/// The start time is persisted as stage metadata so that a later attempt
/// resumes the remaining wait instead of starting over. The duration is
/// read from `with.duration_ms` of the stage configuration.
#[derive(Debug, Clone)]
pub struct WaitExecutor {
    input: ExecutorInput,
}

impl WaitExecutor {
    /// Creates a wait executor for a stage.
    #[must_use]
    pub fn new(input: ExecutorInput) -> Self {
        Self { input }
    }

    fn duration(&self) -> Result<Duration, ExecutorError> {
        self.input
            .stage_config
            .with
            .get("duration_ms")
            .and_then(serde_json::Value::as_u64)
            .map(Duration::from_millis)
            .ok_or_else(|| ExecutorError::InvalidConfig("missing with.duration_ms".to_string()))
    }

    async fn start_time(&self) -> Result<i64, ExecutorError> {
        let stage_id = &self.input.stage.id;
        let store = &self.input.metadata_store;

        // Other keys of the stage are written back untouched.
        let mut metadata = store.get_stage_metadata(stage_id).unwrap_or_default();
        let recorded = metadata
            .get(WAIT_START_TIME_KEY)
            .and_then(|v| v.parse::<i64>().ok());
        if let Some(start) = recorded {
            return Ok(start);
        }

        let now = chrono::Utc::now().timestamp_millis();
        metadata.insert(WAIT_START_TIME_KEY.to_string(), now.to_string());
        store.set_stage_metadata(stage_id, metadata).await?;
        Ok(now)
    }

    async fn run(&self, sig: &StopSignal) -> Result<StageStatus, ExecutorError> {
        let log = &self.input.log_persister;
        if sig.terminated() {
            log.append_info("Stage was stopped before it started");
            return Ok(interrupted_status(sig.kind()));
        }

        let duration = self.duration()?;
        let start = self.start_time().await?;
        let elapsed = chrono::Utc::now().timestamp_millis().saturating_sub(start);
        let remaining = duration.saturating_sub(Duration::from_millis(elapsed.max(0).unsigned_abs()));

        log.append_info(&format!("Waiting for {}ms...", remaining.as_millis()));

        tokio::select! {
            biased;
            kind = sig.wait() => {
                log.append_info(&format!("Wait was interrupted by {kind} signal"));
                Ok(interrupted_status(kind))
            }
            () = tokio::time::sleep(remaining) => {
                log.append_success(&format!("Waited for {}ms", duration.as_millis()));
                Ok(StageStatus::Success)
            }
        }
    }
}

#[async_trait]
impl Executor for WaitExecutor {
    async fn execute(&self, sig: StopSignal) -> StageStatus {
        let result = self.run(&sig).instrument(self.input.logger.clone()).await;
        status_from_result(result, self.input.log_persister.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogSeverity, StageConfig};
    use crate::ports::MetadataStore;
    use crate::testing::TestHarness;
    use std::collections::HashMap;

    fn wait_config(duration_ms: u64) -> StageConfig {
        StageConfig::new("WAIT").with_options(serde_json::json!({ "duration_ms": duration_ms }))
    }

    #[tokio::test]
    async fn test_wait_executor_stopped_before_start() {
        let harness = TestHarness::new();
        let executor = WaitExecutor::new(harness.input(wait_config(60_000)));
        let (signal, handler) = StopSignal::new();
        handler.timeout();

        assert_eq!(executor.execute(signal).await, StageStatus::Failure);
        assert_eq!(harness.log.lines(), vec!["Stage was stopped before it started"]);
    }

    #[tokio::test]
    async fn test_wait_executor_cancelled_mid_wait() {
        let harness = TestHarness::new();
        let executor = WaitExecutor::new(harness.input(wait_config(60_000)));
        let (signal, handler) = StopSignal::new();

        let task = tokio::spawn(async move { executor.execute(signal).await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        handler.cancel();

        let status = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status, StageStatus::Cancelled);
        assert!(harness.log.lines_with(LogSeverity::Error).is_empty());
    }

    #[tokio::test]
    async fn test_wait_executor_keeps_existing_stage_metadata() {
        let harness = TestHarness::new();
        let mut existing = HashMap::new();
        existing.insert("approved-by".to_string(), "alice".to_string());
        harness
            .metadata
            .set_stage_metadata(harness.stage_id(), existing)
            .await
            .unwrap();

        let executor = WaitExecutor::new(harness.input(wait_config(10)));
        let (signal, _handler) = StopSignal::new();
        assert_eq!(executor.execute(signal).await, StageStatus::Success);

        let metadata = harness.metadata.get_stage_metadata(harness.stage_id()).unwrap();
        assert_eq!(metadata.get("approved-by").map(String::as_str), Some("alice"));
        assert!(metadata.contains_key(WAIT_START_TIME_KEY));
    }
}
