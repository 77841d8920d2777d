//! Registry mapping stage kinds to executor factories.

use super::{Executor, ExecutorInput};
use crate::errors::RegistryError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Builds an executor for one stage from its input.
pub type ExecutorFactory = Arc<dyn Fn(ExecutorInput) -> Box<dyn Executor> + Send + Sync>;

/// Maps stage kinds to executor factories.
///
/// Built once while composing the agent: registration takes `&mut self`, so
/// once the registry is shared with the driver it can no longer change.
#[derive(Default)]
pub struct ExecutorRegistry {
    factories: HashMap<String, ExecutorFactory>,
}

impl ExecutorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory for a stage kind.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::AlreadyRegistered` if the kind already has a
    /// factory. The existing registration is kept.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        factory: ExecutorFactory,
    ) -> Result<(), RegistryError> {
        let kind = kind.into();
        if self.factories.contains_key(&kind) {
            return Err(RegistryError::AlreadyRegistered(kind));
        }
        debug!(stage_kind = %kind, "Registered executor factory");
        self.factories.insert(kind, factory);
        Ok(())
    }

    /// Registers a closure building a concrete executor type.
    ///
    /// # Errors
    ///
    /// Same as [`ExecutorRegistry::register`].
    pub fn register_fn<F, E>(&mut self, kind: impl Into<String>, build: F) -> Result<(), RegistryError>
    where
        F: Fn(ExecutorInput) -> E + Send + Sync + 'static,
        E: Executor + 'static,
    {
        self.register(
            kind,
            Arc::new(move |input| Box::new(build(input)) as Box<dyn Executor>),
        )
    }

    /// Returns true if the kind has a factory.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Returns the registered kinds, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<_> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Checks that every kind has a factory before any stage starts.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for the first missing kind.
    pub fn ensure_registered<'a>(
        &self,
        kinds: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), RegistryError> {
        kinds.into_iter().try_for_each(|kind| {
            if self.contains(kind) {
                Ok(())
            } else {
                Err(RegistryError::NotFound(kind.to_string()))
            }
        })
    }

    /// Builds the executor for a stage kind.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` if the kind has no factory.
    pub fn executor(
        &self,
        kind: &str,
        input: ExecutorInput,
    ) -> Result<Box<dyn Executor>, RegistryError> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| RegistryError::NotFound(kind.to_string()))?;
        Ok(factory(input))
    }
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::StopSignal;
    use crate::core::StageStatus;
    use crate::testing::{sample_input, StaticExecutor};

    fn registry_with_wait() -> ExecutorRegistry {
        let mut registry = ExecutorRegistry::new();
        registry
            .register_fn("WAIT", |_| StaticExecutor::new(StageStatus::Success))
            .unwrap();
        registry
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = registry_with_wait();

        let err = registry
            .register_fn("WAIT", |_| StaticExecutor::new(StageStatus::Failure))
            .unwrap_err();

        assert_eq!(err, RegistryError::AlreadyRegistered("WAIT".to_string()));
        assert_eq!(registry.kinds(), vec!["WAIT"]);
    }

    #[tokio::test]
    async fn test_duplicate_registration_keeps_first_factory() {
        let mut registry = registry_with_wait();
        let _ = registry.register_fn("WAIT", |_| StaticExecutor::new(StageStatus::Failure));

        let executor = registry.executor("WAIT", sample_input("WAIT")).unwrap();
        let (signal, _handler) = StopSignal::new();
        assert_eq!(executor.execute(signal).await, StageStatus::Success);
    }

    #[test]
    fn test_unknown_kind_not_found() {
        let registry = registry_with_wait();

        let err = registry
            .executor("K8S_SYNC", sample_input("K8S_SYNC"))
            .err()
            .unwrap();
        assert_eq!(err, RegistryError::NotFound("K8S_SYNC".to_string()));
    }

    #[test]
    fn test_ensure_registered() {
        let mut registry = registry_with_wait();
        registry
            .register_fn("WAIT_APPROVAL", |_| StaticExecutor::new(StageStatus::Success))
            .unwrap();

        assert!(registry.ensure_registered(["WAIT", "WAIT_APPROVAL"]).is_ok());
        assert_eq!(
            registry.ensure_registered(["WAIT", "ANALYSIS", "K8S_SYNC"]),
            Err(RegistryError::NotFound("ANALYSIS".to_string()))
        );
    }

    #[test]
    fn test_kinds_sorted_and_debug() {
        let mut registry = ExecutorRegistry::new();
        for kind in ["WAIT", "ANALYSIS", "K8S_SYNC"] {
            registry
                .register_fn(kind, |_| StaticExecutor::new(StageStatus::Success))
                .unwrap();
        }

        assert_eq!(registry.kinds(), vec!["ANALYSIS", "K8S_SYNC", "WAIT"]);
        assert!(registry.contains("WAIT"));
        assert!(!registry.contains("wait"));
        assert!(format!("{registry:?}").contains("K8S_SYNC"));
    }
}
