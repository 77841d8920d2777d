//! Content-addressed cache of rendered application manifests.

use crate::errors::CacheError;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One rendered resource manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Identifies the resource, e.g. `apps/v1:Deployment:default:web`.
    pub key: String,
    /// The rendered body.
    pub content: serde_json::Value,
}

impl Manifest {
    /// Creates a manifest.
    #[must_use]
    pub fn new(key: impl Into<String>, content: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            content,
        }
    }
}

/// Computes the content address of a set of manifests.
///
/// The address is the lowercase hex SHA-256 of their JSON encoding, so the
/// same manifests in the same order always map to the same key.
pub fn manifests_key(manifests: &[Manifest]) -> Result<String, CacheError> {
    let encoded = serde_json::to_vec(manifests)?;
    Ok(hex::encode(Sha256::digest(&encoded)))
}

/// Cache of rendered manifests.
///
/// Ownership and eviction policy belong to the implementation.
pub trait ManifestCache: Send + Sync {
    /// Returns the manifests stored under a key, or `CacheError::NotFound`.
    fn get(&self, key: &str) -> Result<Vec<Manifest>, CacheError>;

    /// Stores manifests under a key.
    fn put(&self, key: &str, manifests: Vec<Manifest>) -> Result<(), CacheError>;

    /// Removes the entry for a key.
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// A manifest cache kept in memory without eviction.
#[derive(Debug, Default)]
pub struct InMemoryManifestCache {
    entries: DashMap<String, Vec<Manifest>>,
}

impl InMemoryManifestCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores manifests under their content address and returns it.
    pub fn insert(&self, manifests: Vec<Manifest>) -> Result<String, CacheError> {
        let key = manifests_key(&manifests)?;
        self.entries.insert(key.clone(), manifests);
        Ok(key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ManifestCache for InMemoryManifestCache {
    fn get(&self, key: &str) -> Result<Vec<Manifest>, CacheError> {
        self.entries
            .get(key)
            .map(|m| m.value().clone())
            .ok_or(CacheError::NotFound)
    }

    fn put(&self, key: &str, manifests: Vec<Manifest>) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), manifests);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Vec<Manifest> {
        vec![
            Manifest::new("apps/v1:Deployment:default:web", json!({"replicas": 2})),
            Manifest::new("v1:Service:default:web", json!({"port": 80})),
        ]
    }

    #[test]
    fn test_key_is_stable_and_content_sensitive() {
        let key = manifests_key(&sample()).unwrap();
        assert_eq!(key.len(), 64);
        assert_eq!(key, manifests_key(&sample()).unwrap());

        let mut changed = sample();
        changed[0].content = json!({"replicas": 3});
        assert_ne!(key, manifests_key(&changed).unwrap());
    }

    #[test]
    fn test_miss_is_not_found() {
        let cache = InMemoryManifestCache::new();
        assert!(cache.get("abc").unwrap_err().is_not_found());
    }

    #[test]
    fn test_insert_get_delete() {
        let cache = InMemoryManifestCache::new();
        let key = cache.insert(sample()).unwrap();

        assert_eq!(cache.get(&key).unwrap(), sample());
        assert_eq!(cache.len(), 1);

        cache.delete(&key).unwrap();
        assert!(cache.is_empty());
        assert!(cache.get(&key).is_err());
    }

    #[test]
    fn test_put_under_commit_key() {
        let cache = InMemoryManifestCache::new();
        cache.put("commit-abc", sample()).unwrap();
        assert_eq!(cache.get("commit-abc").unwrap().len(), 2);
    }
}
