//! Snapshots of the live resources an application owns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health of a live resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Health could not be determined.
    #[default]
    Unknown,
    /// Resource is healthy.
    Healthy,
    /// Resource is unhealthy.
    Unhealthy,
}

/// Observed state of one live resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveResourceState {
    /// Stable resource ID.
    pub id: String,
    /// Resource name.
    pub name: String,
    /// API version of the resource.
    pub api_version: String,
    /// Resource kind, e.g. `Deployment`.
    pub kind: String,
    /// Namespace, empty for cluster-scoped resources.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// Observed health.
    #[serde(default)]
    pub health_status: HealthStatus,
    /// Why the resource has its health status.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub health_description: String,
    /// IDs of the resources that own this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_ids: Vec<String>,
    /// IDs of the top-level resources this one descends from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_ids: Vec<String>,
    /// When the state was last observed to change.
    pub updated_at: DateTime<Utc>,
}

impl LiveResourceState {
    /// Creates a resource state with unknown health.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            api_version: String::new(),
            kind: kind.into(),
            namespace: String::new(),
            health_status: HealthStatus::Unknown,
            health_description: String::new(),
            owner_ids: Vec::new(),
            parent_ids: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Sets the observed health.
    #[must_use]
    pub fn with_health(mut self, status: HealthStatus, description: impl Into<String>) -> Self {
        self.health_status = status;
        self.health_description = description.into();
        self
    }
}

/// A point-in-time view of all live resources of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveResourceSnapshot {
    /// The observed resources.
    pub resources: Vec<LiveResourceState>,
    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,
}

impl LiveResourceSnapshot {
    /// Creates a snapshot taken now.
    #[must_use]
    pub fn new(resources: Vec<LiveResourceState>) -> Self {
        Self {
            resources,
            captured_at: Utc::now(),
        }
    }

    /// Returns true if every resource reports healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.resources
            .iter()
            .all(|r| r.health_status == HealthStatus::Healthy)
    }

    /// Returns the resources that are not healthy.
    #[must_use]
    pub fn unhealthy(&self) -> Vec<&LiveResourceState> {
        self.resources
            .iter()
            .filter(|r| r.health_status != HealthStatus::Healthy)
            .collect()
    }
}
