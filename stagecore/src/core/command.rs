//! Commands issued to the agent from outside the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of an external command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Approve a stage that is waiting for manual approval.
    ApproveStage,
    /// Cancel a running deployment.
    CancelDeployment,
    /// Trigger a sync of an application.
    SyncApplication,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApproveStage => write!(f, "approve_stage"),
            Self::CancelDeployment => write!(f, "cancel_deployment"),
            Self::SyncApplication => write!(f, "sync_application"),
        }
    }
}

/// How a command was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    /// The command was applied.
    Succeeded,
    /// The command could not be applied.
    Failed,
}

/// A command targeting a deployment or one of its stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Command ID.
    pub id: String,
    /// What the command asks for.
    pub kind: CommandKind,
    /// Target deployment.
    pub deployment_id: String,
    /// Target stage, if the command is stage-scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_id: Option<String>,
    /// Who issued the command.
    pub commander: String,
    /// When the command was issued.
    pub created_at: DateTime<Utc>,
}

impl Command {
    /// Creates an approval command for a stage.
    #[must_use]
    pub fn approve_stage(
        id: impl Into<String>,
        deployment_id: impl Into<String>,
        stage_id: impl Into<String>,
        commander: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: CommandKind::ApproveStage,
            deployment_id: deployment_id.into(),
            stage_id: Some(stage_id.into()),
            commander: commander.into(),
            created_at: Utc::now(),
        }
    }

    /// Creates a cancel command for a deployment.
    #[must_use]
    pub fn cancel_deployment(
        id: impl Into<String>,
        deployment_id: impl Into<String>,
        commander: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: CommandKind::CancelDeployment,
            deployment_id: deployment_id.into(),
            stage_id: None,
            commander: commander.into(),
            created_at: Utc::now(),
        }
    }

    /// Returns true if the command targets the given stage.
    #[must_use]
    pub fn targets_stage(&self, deployment_id: &str, stage_id: &str) -> bool {
        self.deployment_id == deployment_id && self.stage_id.as_deref() == Some(stage_id)
    }
}
