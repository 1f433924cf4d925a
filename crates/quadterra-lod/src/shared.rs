//! Thread-shared terrain access with whole-pass locking.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{CameraState, Terrain, TerrainError, UpdateStats, VisibleChunk};

/// A terrain shared between an update thread and rendering threads.
///
/// Every operation holds the lock for its full duration, so readers only
/// ever observe the visible set of a completed pass. The guard releases the
/// lock on every exit path, including unwinding.
#[derive(Clone, Debug)]
pub struct SharedTerrain {
    inner: Arc<Mutex<Terrain>>,
}

impl SharedTerrain {
    pub fn new(terrain: Terrain) -> Self {
        Self {
            inner: Arc::new(Mutex::new(terrain)),
        }
    }

    /// Acquire exclusive access for a scoped sequence of operations.
    ///
    /// A poisoned lock is recovered: no terrain operation panics while the
    /// tree is mid-mutation.
    pub fn lock(&self) -> MutexGuard<'_, Terrain> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn generate(&self) -> Result<(), TerrainError> {
        self.lock().generate()
    }

    /// Run a full LOD pass under the lock.
    pub fn update(&self, camera: &CameraState) -> UpdateStats {
        self.lock().update(camera)
    }

    /// Copy of the current visible set. Geometry is shared, not cloned.
    pub fn visible_snapshot(&self) -> Vec<VisibleChunk> {
        self.lock().visible_chunks().to_vec()
    }

    /// Number of handles to this terrain.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}
