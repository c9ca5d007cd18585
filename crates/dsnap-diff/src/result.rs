use std::sync::Arc;
use std::time::{Duration, Instant};

use dsnap_types::Snapshot;

use crate::change::{Change, ChangeSummary};
use crate::tree_diff::diff_nodes;

/// The comparison of two snapshots.
///
/// Holds shared references to both snapshots, so it stays valid after the
/// store evicts or deletes them.
#[derive(Clone, Debug)]
pub struct DiffResult {
    pub before: Arc<Snapshot>,
    pub after: Arc<Snapshot>,
    /// Changes ordered by path (moves by source path).
    pub changes: Vec<Change>,
    pub summary: ChangeSummary,
    /// Wall-clock time spent computing the diff.
    pub elapsed: Duration,
}

impl DiffResult {
    /// Diff two snapshots' structures.
    pub fn compute(before: Arc<Snapshot>, after: Arc<Snapshot>) -> Self {
        let started = Instant::now();
        let diff = diff_nodes(&before.structure, &after.structure);
        let summary = diff.summary();
        Self {
            before,
            after,
            changes: diff.changes,
            summary,
            elapsed: started.elapsed(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dsnap_dom::{serialize, Document, Markup};
    use dsnap_types::{SnapshotId, SnapshotMetadata};

    fn snapshot(seq: u64, markup: Markup) -> Arc<Snapshot> {
        let doc = Document::from_markup(&markup).unwrap();
        let tree = serialize(&doc, &doc.root()).unwrap();
        Arc::new(Snapshot::new(
            SnapshotId::new(seq),
            format!("s{seq}"),
            Utc::now(),
            tree,
            SnapshotMetadata::default(),
        ))
    }

    #[test]
    fn same_snapshot_on_both_sides_is_empty() {
        let s = snapshot(1, Markup::element("div").child(Markup::text("x")));
        let result = DiffResult::compute(s.clone(), s);
        assert!(result.is_empty());
        assert_eq!(result.summary.total, 0);
    }

    #[test]
    fn summary_matches_changes() {
        let a = snapshot(1, Markup::element("div").attr("class", "a"));
        let b = snapshot(2, Markup::element("div").attr("class", "b").child(Markup::element("hr")));
        let result = DiffResult::compute(a, b);
        assert_eq!(result.summary.total, result.changes.len());
        assert_eq!(result.summary.modifications, 1);
        assert_eq!(result.summary.additions, 1);
        assert_eq!(result.before.label, "s1");
        assert_eq!(result.after.label, "s2");
    }
}
