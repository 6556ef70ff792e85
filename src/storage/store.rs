use std::path::Path;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use super::{AcceptanceTestRepository, MergeRequestRepository, StateSnapshot, StoryRepository};
use crate::error::{AppError, AppResult};

/// The three record collections guarded together.
#[derive(Debug, Clone, Default)]
pub struct Collections {
    /// Merge requests.
    pub merge_requests: MergeRequestRepository,
    /// Stories and their hierarchy.
    pub stories: StoryRepository,
    /// Acceptance tests.
    pub tests: AcceptanceTestRepository,
}

impl Collections {
    /// Build collections from a snapshot.
    pub fn from_snapshot(snapshot: StateSnapshot) -> Self {
        let mut collections = Self::default();
        collections.merge_requests.reset(snapshot.merge_requests);
        collections.stories.reset(snapshot.stories);
        collections.tests.reset(snapshot.tests);
        collections
    }

    /// Copy out every record.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            merge_requests: self.merge_requests.list(),
            stories: self.stories.list(),
            tests: self.tests.list(),
        }
    }
}

/// Volatile in-memory store.
///
/// A single reader/writer lock covers all collections. Structural writes
/// take the write guard for their whole check-then-act sequence, so a
/// precondition evaluated under the guard still holds when the write
/// lands.
#[derive(Debug, Default)]
pub struct DataStore {
    inner: RwLock<Collections>,
}

impl DataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding a snapshot.
    pub fn with_snapshot(snapshot: StateSnapshot) -> Self {
        Self {
            inner: RwLock::new(Collections::from_snapshot(snapshot)),
        }
    }

    /// Shared access for reads.
    pub fn read(&self) -> RwLockReadGuard<'_, Collections> {
        self.inner.read()
    }

    /// Exclusive access for writes.
    pub fn write(&self) -> RwLockWriteGuard<'_, Collections> {
        self.inner.write()
    }

    /// Copy out every record.
    pub fn snapshot(&self) -> StateSnapshot {
        self.read().snapshot()
    }

    /// Atomically replace all three collections.
    pub fn reset(&self, snapshot: StateSnapshot) {
        let replacement = Collections::from_snapshot(snapshot);
        *self.write() = replacement;
    }

    /// Reset from a seed file. A missing file resets to an empty store.
    pub fn reset_from_seed(&self, path: &Path) -> AppResult<StateSnapshot> {
        let snapshot = load_seed(path)?.unwrap_or_default();
        info!(
            path = %path.display(),
            merge_requests = snapshot.merge_requests.len(),
            stories = snapshot.stories.len(),
            tests = snapshot.tests.len(),
            "seed.loaded"
        );
        self.reset(snapshot);
        Ok(self.snapshot())
    }
}

/// Read a seed file. Returns `None` when the file does not exist.
pub fn load_seed(path: &Path) -> AppResult<Option<StateSnapshot>> {
    if !path.exists() {
        debug!(path = %path.display(), "No seed file found");
        return Ok(None);
    }

    let text = std::fs::read_to_string(path).map_err(|e| AppError::Seed {
        message: format!("Failed to read {}: {}", path.display(), e),
    })?;
    let snapshot = serde_json::from_str(&text).map_err(|e| AppError::Seed {
        message: format!("Failed to parse {}: {}", path.display(), e),
    })?;
    Ok(Some(snapshot))
}
