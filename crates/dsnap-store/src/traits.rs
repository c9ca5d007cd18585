use std::sync::Arc;

use dsnap_types::{Snapshot, SnapshotId, SnapshotInfo};

use crate::error::{StoreError, StoreResult};

/// Snapshot storage.
///
/// All implementations must satisfy these invariants:
/// - Stored snapshots are immutable.
/// - `list()` returns snapshots in creation (id) order.
/// - Bounded implementations evict oldest-first and report what they evicted.
pub trait SnapshotStore {
    /// Store a snapshot and return the ids evicted to make room, oldest
    /// first. Inserting an id that is already present replaces it.
    fn insert(&mut self, snapshot: Snapshot) -> Vec<SnapshotId>;

    /// Look up a snapshot.
    fn get(&self, id: SnapshotId) -> Option<Arc<Snapshot>>;

    /// Remove a snapshot. Returns `true` if it was present.
    fn remove(&mut self, id: SnapshotId) -> bool;

    /// Metadata of every stored snapshot, oldest first.
    fn list(&self) -> Vec<SnapshotInfo>;

    /// Remove every snapshot.
    fn clear(&mut self);

    /// Number of stored snapshots.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether a snapshot is stored.
    fn contains(&self, id: SnapshotId) -> bool {
        self.get(id).is_some()
    }

    /// Look up a snapshot, failing with [`StoreError::NotFound`].
    fn require(&self, id: SnapshotId) -> StoreResult<Arc<Snapshot>> {
        self.get(id).ok_or(StoreError::NotFound(id))
    }
}
