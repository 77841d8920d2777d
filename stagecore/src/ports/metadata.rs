//! Deployment and stage metadata store.
//!
//! Executors record resumable progress here, e.g. the time a wait stage
//! started, so that a later attempt can pick up where an interrupted one
//! left off.

use crate::errors::MetadataStoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;

/// Two-level key/value store scoped to one deployment.
///
/// One flat map holds deployment-wide entries; a second map keyed by stage
/// ID holds one flat map per stage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Returns a deployment-wide value.
    fn get(&self, key: &str) -> Option<String>;

    /// Sets a deployment-wide value.
    async fn set(&self, key: &str, value: &str) -> Result<(), MetadataStoreError>;

    /// Returns the metadata of a stage.
    fn get_stage_metadata(&self, stage_id: &str) -> Option<HashMap<String, String>>;

    /// Replaces the metadata of a stage.
    async fn set_stage_metadata(
        &self,
        stage_id: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), MetadataStoreError>;
}

/// A metadata store kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    shared: DashMap<String, String>,
    stages: DashMap<String, HashMap<String, String>>,
}

impl InMemoryMetadataStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the metadata of earlier attempts.
    #[must_use]
    pub fn with_stage_metadata(
        stages: impl IntoIterator<Item = (String, HashMap<String, String>)>,
    ) -> Self {
        let store = Self::new();
        for (stage_id, metadata) in stages {
            store.stages.insert(stage_id, metadata);
        }
        store
    }

    /// Returns a copy of all deployment-wide entries.
    #[must_use]
    pub fn shared(&self) -> HashMap<String, String> {
        self.shared
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    fn get(&self, key: &str) -> Option<String> {
        self.shared.get(key).map(|v| v.value().clone())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), MetadataStoreError> {
        self.shared.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_stage_metadata(&self, stage_id: &str) -> Option<HashMap<String, String>> {
        self.stages.get(stage_id).map(|m| m.value().clone())
    }

    async fn set_stage_metadata(
        &self,
        stage_id: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), MetadataStoreError> {
        self.stages.insert(stage_id.to_string(), metadata);
        Ok(())
    }
}
