//! Approval stage.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, Instrument};

use super::interrupted_status;
use crate::cancellation::StopSignal;
use crate::core::{CommandKind, CommandStatus, StageStatus};
use crate::errors::ExecutorError;
use crate::executor::{status_from_result, Executor, ExecutorInput};

/// An executor that waits until the stage is approved by a command.
///
/// Commands are polled, since the command lister has no push channel.
#[derive(Debug, Clone)]
pub struct ApprovalExecutor {
    input: ExecutorInput,
    poll_interval: Duration,
}

impl ApprovalExecutor {
    /// Creates an approval executor polling every 10ms.
    #[must_use]
    pub fn new(input: ExecutorInput) -> Self {
        Self {
            input,
            poll_interval: Duration::from_millis(10),
        }
    }

    /// Sets how often commands are polled.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    async fn check_approval(&self) -> Result<Option<String>, ExecutorError> {
        let deployment_id = &self.input.deployment.id;
        let stage_id = &self.input.stage.id;

        let approval = self.input.command_lister.list_commands().into_iter().find(|c| {
            c.command.kind == CommandKind::ApproveStage
                && c.command.targets_stage(deployment_id, stage_id)
        });
        let Some(approval) = approval else {
            return Ok(None);
        };

        approval.report(CommandStatus::Succeeded).await?;
        Ok(Some(approval.command.commander.clone()))
    }

    async fn run(&self, sig: &StopSignal) -> Result<StageStatus, ExecutorError> {
        let log = &self.input.log_persister;
        log.append_info("Waiting for an approval...");

        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                biased;
                kind = sig.wait() => {
                    log.append_info(&format!("Approval wait was interrupted by {kind} signal"));
                    return Ok(interrupted_status(kind));
                }
                _ = ticker.tick() => {
                    if let Some(commander) = self.check_approval().await? {
                        info!(%commander, "Stage approved");
                        log.append_success(&format!("Got an approval from {commander}"));
                        return Ok(StageStatus::Success);
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Executor for ApprovalExecutor {
    async fn execute(&self, sig: StopSignal) -> StageStatus {
        let result = self.run(&sig).instrument(self.input.logger.clone()).await;
        status_from_result(result, self.input.log_persister.as_ref())
    }
}
