//! The input bundle an executor is built from.

use crate::core::{Application, Deployment, PipelineStage, StageConfig};
use crate::ports::{
    CommandLister, InMemoryCommandLister, InMemoryLiveResourceLister, InMemoryManifestCache,
    InMemoryMetadataStore, LiveResourceLister, LogPersister, ManifestCache, MetadataStore,
    NoOpLogPersister,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Span;

/// Everything an executor needs to run one stage.
///
/// The descriptions are read-only; executors only cause side effects
/// through the collaborator handles.
#[derive(Clone)]
pub struct ExecutorInput {
    /// The stage being run.
    pub stage: PipelineStage,
    /// The user configuration of the stage.
    pub stage_config: StageConfig,
    /// The deployment the stage belongs to.
    pub deployment: Arc<Deployment>,
    /// The application being deployed.
    pub application: Arc<Application>,
    /// Scratch directory of the deployment.
    pub working_dir: PathBuf,
    /// Repository checkout at the target commit.
    pub repo_dir: PathBuf,
    /// Repository checkout at the running commit.
    ///
    /// Only valid when the deployment has a running commit.
    pub running_repo_dir: PathBuf,
    /// Scratch directory of this stage.
    pub stage_working_dir: PathBuf,
    /// Parsed deployment configuration of the application.
    ///
    /// Opaque to this crate; executors read the sections they own.
    pub deployment_config: Arc<serde_json::Value>,
    /// Configuration of the agent running the stage.
    pub agent_config: Arc<serde_json::Value>,
    /// Pending external commands.
    pub command_lister: Arc<dyn CommandLister>,
    /// Stage log shown to users.
    pub log_persister: Arc<dyn LogPersister>,
    /// Resumable progress markers.
    pub metadata_store: Arc<dyn MetadataStore>,
    /// Rendered manifests of the application.
    pub app_manifests_cache: Arc<dyn ManifestCache>,
    /// Live state of the application's resources.
    pub app_live_resource_lister: Arc<dyn LiveResourceLister>,
    /// Span the executor logs under.
    pub logger: Span,
}

impl ExecutorInput {
    /// Creates an input with in-memory collaborators and a discarding log.
    ///
    /// Directories default to relative paths derived from the deployment
    /// and stage IDs; override them with the `with_*` methods.
    #[must_use]
    pub fn new(
        stage: PipelineStage,
        stage_config: StageConfig,
        deployment: Arc<Deployment>,
        application: Arc<Application>,
    ) -> Self {
        let working_dir = PathBuf::from(&deployment.id);
        let logger = tracing::info_span!(
            "stage",
            deployment_id = %deployment.id,
            stage_id = %stage.id,
            stage_name = %stage.name,
        );
        Self {
            repo_dir: working_dir.join("target-deploysource"),
            running_repo_dir: working_dir.join("running-deploysource"),
            stage_working_dir: working_dir.join(&stage.id),
            working_dir,
            deployment_config: Arc::new(serde_json::Value::Null),
            agent_config: Arc::new(serde_json::Value::Null),
            stage,
            stage_config,
            deployment,
            application,
            command_lister: Arc::new(InMemoryCommandLister::new()),
            log_persister: Arc::new(NoOpLogPersister),
            metadata_store: Arc::new(InMemoryMetadataStore::new()),
            app_manifests_cache: Arc::new(InMemoryManifestCache::new()),
            app_live_resource_lister: Arc::new(InMemoryLiveResourceLister::new()),
            logger,
        }
    }

    /// Places every directory under the given working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.repo_dir = dir.join("target-deploysource");
        self.running_repo_dir = dir.join("running-deploysource");
        self.stage_working_dir = dir.join(&self.stage.id);
        self.working_dir = dir;
        self
    }

    /// Sets the deployment configuration.
    #[must_use]
    pub fn with_deployment_config(mut self, config: Arc<serde_json::Value>) -> Self {
        self.deployment_config = config;
        self
    }

    /// Sets the agent configuration.
    #[must_use]
    pub fn with_agent_config(mut self, config: Arc<serde_json::Value>) -> Self {
        self.agent_config = config;
        self
    }

    /// Sets the command lister.
    #[must_use]
    pub fn with_command_lister(mut self, lister: Arc<dyn CommandLister>) -> Self {
        self.command_lister = lister;
        self
    }

    /// Sets the log persister.
    #[must_use]
    pub fn with_log_persister(mut self, persister: Arc<dyn LogPersister>) -> Self {
        self.log_persister = persister;
        self
    }

    /// Sets the metadata store.
    #[must_use]
    pub fn with_metadata_store(mut self, store: Arc<dyn MetadataStore>) -> Self {
        self.metadata_store = store;
        self
    }

    /// Sets the manifest cache.
    #[must_use]
    pub fn with_manifests_cache(mut self, cache: Arc<dyn ManifestCache>) -> Self {
        self.app_manifests_cache = cache;
        self
    }

    /// Sets the live resource lister.
    #[must_use]
    pub fn with_live_resource_lister(mut self, lister: Arc<dyn LiveResourceLister>) -> Self {
        self.app_live_resource_lister = lister;
        self
    }

    /// Sets the span the executor logs under.
    #[must_use]
    pub fn with_logger(mut self, logger: Span) -> Self {
        self.logger = logger;
        self
    }

    /// Returns the running-commit checkout, if the deployment has one.
    #[must_use]
    pub fn running_repo_dir(&self) -> Option<&Path> {
        self.deployment
            .running_commit_hash
            .as_ref()
            .map(|_| self.running_repo_dir.as_path())
    }
}

impl fmt::Debug for ExecutorInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorInput")
            .field("stage_id", &self.stage.id)
            .field("stage_name", &self.stage.name)
            .field("deployment_id", &self.deployment.id)
            .field("application_id", &self.application.id)
            .field("working_dir", &self.working_dir)
            .finish_non_exhaustive()
    }
}
