//! Test fixtures for building executor inputs.

use std::sync::Arc;

use crate::core::{Application, Deployment, PipelineStage, StageConfig, StageStatus};
use crate::executor::ExecutorInput;
use crate::ports::{
    InMemoryCommandLister, InMemoryLiveResourceLister, InMemoryLogPersister,
    InMemoryManifestCache, InMemoryMetadataStore,
};

/// Builds an input for a stage of the given kind with default collaborators.
#[must_use]
pub fn sample_input(kind: &str) -> ExecutorInput {
    TestHarness::new().input(StageConfig::new(kind))
}

/// In-memory collaborators shared with every input the harness builds,
/// so tests can inspect what an executor wrote.
#[derive(Debug, Clone)]
pub struct TestHarness {
    /// The application under deployment.
    pub application: Arc<Application>,
    /// The deployment the stage belongs to.
    pub deployment: Arc<Deployment>,
    /// Stage log.
    pub log: Arc<InMemoryLogPersister>,
    /// Metadata store.
    pub metadata: Arc<InMemoryMetadataStore>,
    /// Command queue.
    pub commands: InMemoryCommandLister,
    /// Live resources.
    pub resources: Arc<InMemoryLiveResourceLister>,
    /// Manifest cache.
    pub cache: Arc<InMemoryManifestCache>,
    /// Status recorded for the stage before the attempt.
    pub prior_status: StageStatus,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    /// Creates a harness for deployment `dep-1` of application `app-1`.
    #[must_use]
    pub fn new() -> Self {
        let application = Application::new("app-1", "web", "kubernetes").with_project("proj-1");
        let deployment = Deployment::new("dep-1", &application).with_trigger_commit("0123abcd");
        Self {
            application: Arc::new(application),
            deployment: Arc::new(deployment),
            log: Arc::new(InMemoryLogPersister::new()),
            metadata: Arc::new(InMemoryMetadataStore::new()),
            commands: InMemoryCommandLister::new(),
            resources: Arc::new(InMemoryLiveResourceLister::new()),
            cache: Arc::new(InMemoryManifestCache::new()),
            prior_status: StageStatus::NotStartedYet,
        }
    }

    /// Sets the status recorded before the attempt.
    #[must_use]
    pub fn with_prior_status(mut self, status: StageStatus) -> Self {
        self.prior_status = status;
        self
    }

    /// ID of the stage inputs are built for.
    #[must_use]
    pub fn stage_id(&self) -> &'static str {
        "stage-1"
    }

    /// Builds an input for stage `stage-1` with the given configuration.
    #[must_use]
    pub fn input(&self, config: StageConfig) -> ExecutorInput {
        let stage = PipelineStage::new(self.stage_id(), config.name.clone())
            .with_status(self.prior_status);
        ExecutorInput::new(
            stage,
            config,
            self.deployment.clone(),
            self.application.clone(),
        )
        .with_log_persister(self.log.clone())
        .with_metadata_store(self.metadata.clone())
        .with_command_lister(Arc::new(self.commands.clone()))
        .with_live_resource_lister(self.resources.clone())
        .with_manifests_cache(self.cache.clone())
    }
}
