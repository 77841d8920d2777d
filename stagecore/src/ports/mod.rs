//! Collaborator ports injected into executors.
//!
//! Each port is a narrow capability an executor depends on. The storage
//! behind them lives elsewhere; the in-memory implementations here are for
//! composition without a backend and for tests.

mod cache;
mod commands;
mod log;
mod metadata;
mod resources;

pub use cache::{manifests_key, InMemoryManifestCache, Manifest, ManifestCache};
pub use commands::{
    CommandLister, CommandReporter, InMemoryCommandLister, ReportableCommand,
};
pub use log::{
    InMemoryLogPersister, LogBlock, LogPersister, NoOpLogPersister, TracingLogPersister,
};
pub use metadata::{InMemoryMetadataStore, MetadataStore};
pub use resources::{InMemoryLiveResourceLister, LiveResourceLister};

#[cfg(test)]
pub use metadata::MockMetadataStore;
