//! Read access to the live state of an application's resources.

use crate::core::LiveResourceSnapshot;
use parking_lot::RwLock;

/// Reads the latest snapshot of live resources.
pub trait LiveResourceLister: Send + Sync {
    /// Returns the latest snapshot, or `None` if none is available yet.
    ///
    /// `None` is not an error: the watcher may simply not have synced.
    fn list_live_resources(&self) -> Option<LiveResourceSnapshot>;
}

/// A live resource lister fed by hand.
#[derive(Debug, Default)]
pub struct InMemoryLiveResourceLister {
    snapshot: RwLock<Option<LiveResourceSnapshot>>,
}

impl InMemoryLiveResourceLister {
    /// Creates a lister with no snapshot yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current snapshot.
    pub fn update(&self, snapshot: LiveResourceSnapshot) {
        *self.snapshot.write() = Some(snapshot);
    }
}

impl LiveResourceLister for InMemoryLiveResourceLister {
    fn list_live_resources(&self) -> Option<LiveResourceSnapshot> {
        self.snapshot.read().clone()
    }
}
