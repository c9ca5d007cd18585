use std::collections::BTreeMap;
use std::sync::Arc;

use dsnap_types::{Snapshot, SnapshotId, SnapshotInfo};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::SnapshotStore;

/// Capacity of [`InMemorySnapshotStore::default`].
pub const DEFAULT_CAPACITY: usize = 10;

/// Bounded, `BTreeMap`-based snapshot store.
///
/// Keys are snapshot ids, which are assigned in creation order, so the first
/// entry is always the oldest snapshot and eviction is a `pop_first`.
pub struct InMemorySnapshotStore {
    snapshots: BTreeMap<SnapshotId, Arc<Snapshot>>,
    capacity: usize,
}

impl InMemorySnapshotStore {
    /// Create an empty store holding at most `capacity` snapshots.
    pub fn with_capacity(capacity: usize) -> StoreResult<Self> {
        if capacity == 0 {
            return Err(StoreError::InvalidCapacity(capacity));
        }
        Ok(Self {
            snapshots: BTreeMap::new(),
            capacity,
        })
    }

    /// Maximum number of snapshots held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Ids of all stored snapshots, oldest first.
    pub fn ids(&self) -> Vec<SnapshotId> {
        self.snapshots.keys().copied().collect()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn insert(&mut self, snapshot: Snapshot) -> Vec<SnapshotId> {
        self.snapshots.insert(snapshot.id, Arc::new(snapshot));
        let mut evicted = Vec::new();
        while self.snapshots.len() > self.capacity {
            if let Some((id, _)) = self.snapshots.pop_first() {
                debug!(snapshot = %id, capacity = self.capacity, "snapshot evicted");
                evicted.push(id);
            }
        }
        evicted
    }

    fn get(&self, id: SnapshotId) -> Option<Arc<Snapshot>> {
        self.snapshots.get(&id).cloned()
    }

    fn remove(&mut self, id: SnapshotId) -> bool {
        self.snapshots.remove(&id).is_some()
    }

    fn list(&self) -> Vec<SnapshotInfo> {
        self.snapshots.values().map(|s| s.info()).collect()
    }

    fn clear(&mut self) {
        self.snapshots.clear();
    }

    fn len(&self) -> usize {
        self.snapshots.len()
    }

    fn contains(&self, id: SnapshotId) -> bool {
        self.snapshots.contains_key(&id)
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self {
            snapshots: BTreeMap::new(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl std::fmt::Debug for InMemorySnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySnapshotStore")
            .field("snapshot_count", &self.snapshots.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dsnap_types::{NodeHash, SerializedNode, SnapshotMetadata};

    fn make_snapshot(seq: u64) -> Snapshot {
        let root = SerializedNode {
            path: String::new(),
            tag_name: "div".into(),
            id: None,
            class_name: None,
            attributes: Default::default(),
            text_content: None,
            children: vec![],
            hash: NodeHash::from_u64(seq),
        };
        Snapshot::new(
            SnapshotId::new(seq),
            format!("Snapshot {seq}"),
            Utc::now(),
            root,
            SnapshotMetadata::default(),
        )
    }

    #[test]
    fn zero_capacity_rejected() {
        assert_eq!(
            InMemorySnapshotStore::with_capacity(0).unwrap_err(),
            StoreError::InvalidCapacity(0)
        );
    }

    #[test]
    fn default_capacity() {
        assert_eq!(InMemorySnapshotStore::default().capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn insert_and_get() {
        let mut store = InMemorySnapshotStore::with_capacity(3).unwrap();
        assert!(store.insert(make_snapshot(1)).is_empty());
        let snap = store.get(SnapshotId::new(1)).expect("should exist");
        assert_eq!(snap.label, "Snapshot 1");
        assert!(store.contains(SnapshotId::new(1)));
        assert!(!store.contains(SnapshotId::new(2)));
    }

    #[test]
    fn exceeding_capacity_evicts_oldest() {
        let mut store = InMemorySnapshotStore::with_capacity(2).unwrap();
        store.insert(make_snapshot(1));
        store.insert(make_snapshot(2));
        let evicted = store.insert(make_snapshot(3));
        assert_eq!(evicted, vec![SnapshotId::new(1)]);
        assert_eq!(store.ids(), vec![SnapshotId::new(2), SnapshotId::new(3)]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn list_never_exceeds_capacity() {
        let mut store = InMemorySnapshotStore::with_capacity(4).unwrap();
        for seq in 1..=20 {
            store.insert(make_snapshot(seq));
            assert!(store.list().len() <= 4);
        }
        let labels: Vec<String> = store.list().into_iter().map(|i| i.label).collect();
        assert_eq!(
            labels,
            vec!["Snapshot 17", "Snapshot 18", "Snapshot 19", "Snapshot 20"]
        );
    }

    #[test]
    fn evicted_snapshot_stays_alive_for_holders() {
        let mut store = InMemorySnapshotStore::with_capacity(1).unwrap();
        store.insert(make_snapshot(1));
        let held = store.get(SnapshotId::new(1)).unwrap();
        store.insert(make_snapshot(2));
        assert!(store.get(SnapshotId::new(1)).is_none());
        assert_eq!(held.id, SnapshotId::new(1));
    }

    #[test]
    fn remove_and_clear() {
        let mut store = InMemorySnapshotStore::with_capacity(5).unwrap();
        store.insert(make_snapshot(1));
        store.insert(make_snapshot(2));
        assert!(store.remove(SnapshotId::new(1)));
        assert!(!store.remove(SnapshotId::new(1)));
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn require_reports_missing_id() {
        let store = InMemorySnapshotStore::with_capacity(1).unwrap();
        assert_eq!(
            store.require(SnapshotId::new(9)).unwrap_err(),
            StoreError::NotFound(SnapshotId::new(9))
        );
    }
}
