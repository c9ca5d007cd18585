use std::sync::Arc;

use chrono::Utc;
use dsnap_diff::DiffResult;
use dsnap_dom::{serialize, Document, DomReader};
use dsnap_store::{InMemorySnapshotStore, SnapshotStore};
use dsnap_types::{Snapshot, SnapshotId, SnapshotInfo};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

/// Captures, stores and compares document snapshots.
///
/// Snapshot ids come from a counter that only advances when a capture
/// succeeds, so ids are dense over stored-or-evicted snapshots and never
/// reused. Once more than `max_snapshots` are held, the oldest is evicted.
pub struct SnapshotEngine {
    config: EngineConfig,
    store: InMemorySnapshotStore,
    next_seq: u64,
}

impl SnapshotEngine {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            store: InMemorySnapshotStore::default(),
            next_seq: 1,
        }
    }

    /// Create an engine with a validated configuration.
    pub fn with_config(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let store = InMemorySnapshotStore::with_capacity(config.max_snapshots)
            .map_err(|e| EngineError::Config(e.to_string()))?;
        Ok(Self {
            config,
            store,
            next_seq: 1,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---- Capture ----

    /// Serialize the subtree at `root` and store it as a new snapshot.
    ///
    /// Without a label the snapshot is named `"<prefix> <n>"`. Nothing is
    /// stored and no id is consumed if serialization fails.
    pub fn create_snapshot<R: DomReader>(
        &mut self,
        reader: &R,
        root: &R::Handle,
        label: Option<&str>,
    ) -> EngineResult<SnapshotId> {
        let structure = serialize(reader, root)?;

        let seq = self.next_seq;
        self.next_seq += 1;
        let id = SnapshotId::new(seq);
        let label = match label {
            Some(label) => label.to_string(),
            None => format!("{} {}", self.config.default_label_prefix, seq),
        };

        let snapshot = Snapshot::new(id, label, Utc::now(), structure, reader.metadata());
        info!(
            snapshot = %id,
            label = %snapshot.label,
            elements = snapshot.element_count,
            "snapshot created"
        );

        let evicted = self.store.insert(snapshot);
        if !evicted.is_empty() {
            debug!(
                count = evicted.len(),
                oldest = %evicted[0],
                max_snapshots = self.config.max_snapshots,
                "evicted snapshots over capacity"
            );
        }
        Ok(id)
    }

    /// Start recording mutations on `document` with the configured bounds.
    pub fn start_tracking(&self, document: &mut Document) {
        document.start_tracking(self.config.mutation_log);
    }

    // ---- Compare & export ----

    /// Diff two stored snapshots.
    pub fn compare_snapshots(
        &self,
        before: SnapshotId,
        after: SnapshotId,
    ) -> EngineResult<DiffResult> {
        let before = self.lookup(before)?;
        let after = self.lookup(after)?;
        let diff = DiffResult::compute(before, after);
        info!(
            before = %diff.before.id,
            after = %diff.after.id,
            changes = diff.summary.total,
            elapsed_us = diff.elapsed.as_micros() as u64,
            "snapshots compared"
        );
        Ok(diff)
    }

    /// Diff two stored snapshots named in their `snapshot-<n>` form.
    pub fn compare_snapshot_refs(&self, before: &str, after: &str) -> EngineResult<DiffResult> {
        let before = parse_ref(before)?;
        let after = parse_ref(after)?;
        self.compare_snapshots(before, after)
    }

    /// Render a diff as `"json"`/`"structured"` or `"text"`/`"long"`.
    pub fn export_diff(&self, diff: &DiffResult, format: &str) -> EngineResult<String> {
        Ok(dsnap_report::render(diff, format)?)
    }

    // ---- Store management ----

    /// All stored snapshots, oldest first, without their trees.
    pub fn get_snapshots(&self) -> Vec<SnapshotInfo> {
        self.store.list()
    }

    pub fn get_snapshot(&self, id: SnapshotId) -> Option<Arc<Snapshot>> {
        self.store.get(id)
    }

    /// Remove a snapshot. Returns `false` if it was not stored.
    pub fn delete_snapshot(&mut self, id: SnapshotId) -> bool {
        let removed = self.store.remove(id);
        debug!(snapshot = %id, removed, "delete snapshot");
        removed
    }

    /// Remove every stored snapshot. The id counter keeps counting.
    pub fn clear_snapshots(&mut self) {
        debug!(count = self.store.len(), "clearing snapshots");
        self.store.clear();
    }

    fn lookup(&self, id: SnapshotId) -> EngineResult<Arc<Snapshot>> {
        self.store
            .require(id)
            .map_err(|_| EngineError::InvalidSnapshotReference(id.to_string()))
    }
}

impl Default for SnapshotEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_ref(reference: &str) -> EngineResult<SnapshotId> {
    reference
        .parse()
        .map_err(|_| EngineError::InvalidSnapshotReference(reference.to_string()))
}
