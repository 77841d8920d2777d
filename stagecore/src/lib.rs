//! # Stagecore
//!
//! The per-stage execution core of a deployment pipeline agent.
//!
//! Stagecore provides the pieces a pipeline driver wires around each stage:
//!
//! - **Stop signals**: a first-write-wins signal an executor waits on and the
//!   driver fires on shutdown, cancellation or deadline expiry
//! - **Status resolution**: one table deciding the status to persist from the
//!   signal, the prior status and the executor's own verdict
//! - **Executor registry**: a write-once map from stage kind to factory
//! - **Collaborator ports**: stage log, metadata store, command lister, live
//!   resources and manifest cache, with in-memory implementations
//! - **Stage runner**: deadline, grace period and panic handling around one
//!   executor run
//! - **Built-in stages**: a resumable wait and an approval gate
//!
//! Executor doubles and an in-memory test harness live in `testing`
//! behind the `testing` feature.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stagecore::prelude::*;
//!
//! let mut registry = ExecutorRegistry::new();
//! registry.register_fn("WAIT", WaitExecutor::new)?;
//!
//! let runner = StageRunner::new(&registry, RunnerConfig::new());
//! let (_signal, handler) = StopSignal::new();
//! let report = runner.run(input, handler).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod core;
pub mod errors;
pub mod executor;
pub mod observability;
pub mod ports;
pub mod runner;
pub mod stages;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::{StopSignal, StopSignalHandler, StopSignalKind};
    pub use crate::core::{
        Application, Command, CommandKind, CommandStatus, Deployment, LogSeverity,
        PipelineStage, StageConfig, StageStatus,
    };
    pub use crate::errors::{
        CacheError, CommandReportError, ExecutorError, MetadataStoreError, RegistryError,
    };
    pub use crate::executor::{
        determine_stage_status, Executor, ExecutorFactory, ExecutorInput, ExecutorRegistry,
    };
    pub use crate::observability::{init_tracing, LogFormat};
    pub use crate::ports::{
        CommandLister, LiveResourceLister, LogPersister, ManifestCache, MetadataStore,
    };
    pub use crate::runner::{RunnerConfig, StageRunReport, StageRunner};
    pub use crate::stages::{ApprovalExecutor, WaitExecutor};
}
