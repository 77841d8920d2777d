//! Error types for the stage execution core.
//!
//! None of these cross the executor boundary: an executor turns them into
//! a `StageStatus` plus a log line. The registry errors are configuration
//! errors and surface to the driver before any stage work starts.

use thiserror::Error;

/// Configuration error raised by the executor registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A factory was registered twice for the same stage kind.
    #[error("executor for stage kind '{0}' is already registered")]
    AlreadyRegistered(String),

    /// No factory is registered for the stage kind.
    #[error("no executor registered for stage kind '{0}'")]
    NotFound(String),
}

impl RegistryError {
    /// Returns the stage kind the error is about.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::AlreadyRegistered(kind) | Self::NotFound(kind) => kind,
        }
    }
}

/// Error raised by a metadata store backend.
#[derive(Debug, Error)]
pub enum MetadataStoreError {
    /// The backend rejected or failed the write.
    #[error("failed to persist metadata: {0}")]
    Backend(String),

    /// The value could not be encoded.
    #[error("failed to encode metadata: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error raised by a manifest cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No entry exists for the key.
    #[error("cache entry not found")]
    NotFound,

    /// The manifests could not be encoded for hashing or storage.
    #[error("failed to encode manifests: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend failed.
    #[error("cache backend error: {0}")]
    Backend(String),
}

impl CacheError {
    /// Returns true if the error is a cache miss.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Error raised when reporting the outcome of a command fails.
#[derive(Debug, Clone, Error)]
#[error("failed to report command {command_id}: {message}")]
pub struct CommandReportError {
    /// The command being reported.
    pub command_id: String,
    /// Why the report failed.
    pub message: String,
}

impl CommandReportError {
    /// Creates a new report error.
    #[must_use]
    pub fn new(command_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            command_id: command_id.into(),
            message: message.into(),
        }
    }
}

/// Internal error of an executor.
///
/// Executors may use `?` on collaborator calls and convert the result with
/// [`crate::executor::status_from_result`] at the end of `execute`.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Metadata could not be persisted.
    #[error(transparent)]
    Metadata(#[from] MetadataStoreError),

    /// The manifest cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A command could not be reported.
    #[error(transparent)]
    CommandReport(#[from] CommandReportError),

    /// The stage configuration is invalid.
    #[error("invalid stage configuration: {0}")]
    InvalidConfig(String),

    /// Any other failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
