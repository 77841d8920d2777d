//! Read-only descriptions of the stage, deployment and application an
//! executor works on.

use super::StageStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// A stage of a deployment pipeline as recorded by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStage {
    /// Unique stage ID within the deployment.
    pub id: String,
    /// Stage kind name, e.g. `WAIT` or `K8S_SYNC`.
    pub name: String,
    /// Human readable description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
    /// Position of the stage in the pipeline.
    pub index: u32,
    /// Whether the stage was added by the agent rather than the user.
    #[serde(default)]
    pub predefined: bool,
    /// IDs of stages that must finish before this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    /// Whether the stage is visible in the UI.
    #[serde(default)]
    pub visible: bool,
    /// Status recorded before the current attempt.
    #[serde(default)]
    pub status: StageStatus,
    /// Stage metadata recorded by previous attempts.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    /// How many times the stage has been retried.
    #[serde(default)]
    pub retried_count: u32,
    /// When the stage completed, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// When the stage was created.
    pub created_at: DateTime<Utc>,
    /// When the stage was last updated.
    pub updated_at: DateTime<Utc>,
}

impl PipelineStage {
    /// Creates a stage that has not been started yet.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            desc: String::new(),
            index: 0,
            predefined: false,
            requires: Vec::new(),
            visible: true,
            status: StageStatus::NotStartedYet,
            metadata: HashMap::new(),
            retried_count: 0,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the position of the stage.
    #[must_use]
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    /// Sets the recorded status.
    #[must_use]
    pub fn with_status(mut self, status: StageStatus) -> Self {
        self.status = status;
        self
    }

    /// Adds a required stage.
    #[must_use]
    pub fn with_requirement(mut self, stage_id: impl Into<String>) -> Self {
        self.requires.push(stage_id.into());
        self
    }
}

/// The user-supplied configuration of one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Stage kind name, used to pick the executor.
    pub name: String,
    /// Optional user-defined stage ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human readable description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
    /// Deadline for one attempt of the stage, in milliseconds.
    ///
    /// Zero means no deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Stage-specific options.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub with: serde_json::Value,
}

impl StageConfig {
    /// Creates a configuration for the given stage kind.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            desc: String::new(),
            timeout_ms: None,
            with: serde_json::Value::Null,
        }
    }

    /// Sets the attempt deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Sets the stage-specific options.
    #[must_use]
    pub fn with_options(mut self, with: serde_json::Value) -> Self {
        self.with = with;
        self
    }

    /// Returns the attempt deadline, if configured and non-zero.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

/// The deployment a stage belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Deployment ID.
    pub id: String,
    /// ID of the deployed application.
    pub application_id: String,
    /// Name of the deployed application.
    pub application_name: String,
    /// Project the deployment belongs to.
    pub project_id: String,
    /// Kind of application being deployed, e.g. `kubernetes`.
    pub kind: String,
    /// Commit the deployment rolls out.
    pub trigger_commit_hash: String,
    /// Commit currently running, empty for the first deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_commit_hash: Option<String>,
    /// The pipeline stages of this deployment.
    #[serde(default)]
    pub stages: Vec<PipelineStage>,
    /// When the deployment was created.
    pub created_at: DateTime<Utc>,
}

impl Deployment {
    /// Creates a deployment of the given application.
    #[must_use]
    pub fn new(id: impl Into<String>, application: &Application) -> Self {
        Self {
            id: id.into(),
            application_id: application.id.clone(),
            application_name: application.name.clone(),
            project_id: application.project_id.clone(),
            kind: application.kind.clone(),
            trigger_commit_hash: String::new(),
            running_commit_hash: None,
            stages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Sets the commit being rolled out.
    #[must_use]
    pub fn with_trigger_commit(mut self, hash: impl Into<String>) -> Self {
        self.trigger_commit_hash = hash.into();
        self
    }

    /// Sets the currently running commit.
    #[must_use]
    pub fn with_running_commit(mut self, hash: impl Into<String>) -> Self {
        self.running_commit_hash = Some(hash.into());
        self
    }

    /// Appends a pipeline stage.
    #[must_use]
    pub fn with_stage(mut self, stage: PipelineStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Finds a stage by ID.
    #[must_use]
    pub fn stage(&self, stage_id: &str) -> Option<&PipelineStage> {
        self.stages.iter().find(|s| s.id == stage_id)
    }
}

/// The application being deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Application ID.
    pub id: String,
    /// Application name.
    pub name: String,
    /// Application kind, e.g. `kubernetes`.
    pub kind: String,
    /// Owning project.
    pub project_id: String,
    /// Environment the application is deployed to.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub env_id: String,
    /// Path of the application directory inside its repository.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub git_path: String,
}

impl Application {
    /// Creates an application description.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
            project_id: String::new(),
            env_id: String::new(),
            git_path: String::new(),
        }
    }

    /// Sets the owning project.
    #[must_use]
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_config_timeout() {
        let config = StageConfig::new("WAIT");
        assert!(config.timeout().is_none());

        let config = config.with_timeout(Duration::from_secs(90));
        assert_eq!(config.timeout(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_stage_config_sub_second_timeout_is_kept() {
        let config = StageConfig::new("WAIT").with_timeout(Duration::from_millis(1500));
        assert_eq!(config.timeout_ms, Some(1500));
        assert_eq!(config.timeout(), Some(Duration::from_millis(1500)));

        let config = StageConfig::new("WAIT").with_timeout(Duration::from_millis(500));
        assert_eq!(config.timeout(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_stage_config_zero_timeout_means_no_deadline() {
        let config: StageConfig =
            serde_json::from_str(r#"{"name": "WAIT", "timeout_ms": 0}"#).unwrap();
        assert_eq!(config.timeout_ms, Some(0));
        assert!(config.timeout().is_none());

        assert!(StageConfig::new("WAIT").with_timeout(Duration::ZERO).timeout().is_none());
    }

    #[test]
    fn test_stage_config_deserialize_defaults() {
        let config: StageConfig = serde_json::from_str(r#"{"name": "WAIT"}"#).unwrap();
        assert_eq!(config.name, "WAIT");
        assert!(config.id.is_none());
        assert!(config.with.is_null());
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_deployment_from_application() {
        let app = Application::new("app-1", "frontend", "kubernetes").with_project("proj");
        let deployment = Deployment::new("dep-1", &app)
            .with_trigger_commit("abc123")
            .with_stage(PipelineStage::new("stage-0", "WAIT"));

        assert_eq!(deployment.application_id, "app-1");
        assert_eq!(deployment.project_id, "proj");
        assert_eq!(deployment.kind, "kubernetes");
        assert!(deployment.running_commit_hash.is_none());
        assert_eq!(deployment.stage("stage-0").map(|s| s.name.as_str()), Some("WAIT"));
        assert!(deployment.stage("missing").is_none());
    }

    #[test]
    fn test_pipeline_stage_defaults() {
        let stage = PipelineStage::new("s1", "WAIT_APPROVAL").with_index(2);
        assert_eq!(stage.status, StageStatus::NotStartedYet);
        assert_eq!(stage.index, 2);
        assert!(stage.metadata.is_empty());
    }
}
