//! Cooperative interruption of a running stage.
//!
//! This module provides:
//! - StopSignal, the read side an executor waits on
//! - StopSignalHandler, the write side the driver fires on shutdown,
//!   cancellation or deadline expiry

mod signal;

pub use signal::{StopSignal, StopSignalHandler, StopSignalKind};
