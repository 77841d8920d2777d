//! Core domain model types.
//!
//! This module contains the data an executor reads and reports:
//! - Stage status and log severity enums
//! - Pipeline stage, deployment and application descriptions
//! - External commands and live resource snapshots

mod command;
mod model;
mod resource;
mod status;

pub use command::{Command, CommandKind, CommandStatus};
pub use model::{Application, Deployment, PipelineStage, StageConfig};
pub use resource::{HealthStatus, LiveResourceSnapshot, LiveResourceState};
pub use status::{LogSeverity, StageStatus};
