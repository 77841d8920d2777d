//! Testing utilities for executors and drivers.
//!
//! Compiled for this crate's tests and behind the `testing` feature.
//!
//! This module provides:
//! - Executor doubles: fixed status, signal-ignoring and panicking
//! - A harness wiring in-memory collaborators into executor inputs

mod executors;
mod fixtures;

pub use executors::{PanickingExecutor, StaticExecutor, StubbornExecutor};
pub use fixtures::{sample_input, TestHarness};
