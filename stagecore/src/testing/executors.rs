//! Executor doubles for exercising drivers.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::cancellation::StopSignal;
use crate::core::StageStatus;
use crate::executor::Executor;

/// An executor that returns a fixed status and counts its runs.
#[derive(Debug)]
pub struct StaticExecutor {
    status: StageStatus,
    runs: Arc<AtomicUsize>,
}

impl StaticExecutor {
    /// Creates an executor always returning `status`.
    #[must_use]
    pub fn new(status: StageStatus) -> Self {
        Self {
            status,
            runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shares a run counter with the caller.
    #[must_use]
    pub fn with_counter(mut self, runs: Arc<AtomicUsize>) -> Self {
        self.runs = runs;
        self
    }
}

#[async_trait]
impl Executor for StaticExecutor {
    async fn execute(&self, _sig: StopSignal) -> StageStatus {
        self.runs.fetch_add(1, Ordering::SeqCst);
        self.status
    }
}

/// An executor that ignores the stop signal and sleeps before succeeding.
#[derive(Debug, Clone, Copy)]
pub struct StubbornExecutor {
    delay: Duration,
}

impl StubbornExecutor {
    /// Creates an executor that sleeps for `delay`.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Executor for StubbornExecutor {
    async fn execute(&self, _sig: StopSignal) -> StageStatus {
        tokio::time::sleep(self.delay).await;
        StageStatus::Success
    }
}

/// An executor that panics, for exercising driver-side recovery.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingExecutor;

#[async_trait]
impl Executor for PanickingExecutor {
    async fn execute(&self, _sig: StopSignal) -> StageStatus {
        panic!("executor bug")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_executor_counts_runs() {
        let runs = Arc::new(AtomicUsize::new(0));
        let executor = StaticExecutor::new(StageStatus::Skipped).with_counter(runs.clone());
        let (signal, _handler) = StopSignal::new();

        assert_eq!(executor.execute(signal.clone()).await, StageStatus::Skipped);
        assert_eq!(executor.execute(signal).await, StageStatus::Skipped);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stubborn_executor_ignores_signal() {
        let executor = StubbornExecutor::new(Duration::from_millis(20));
        let (signal, handler) = StopSignal::new();
        handler.cancel();

        assert_eq!(executor.execute(signal).await, StageStatus::Success);
    }
}
