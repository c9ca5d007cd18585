//! Tree-level diff: compare two serialized trees and classify every change.
//!
//! Both trees are flattened to path-keyed maps. Paths present on one side
//! only become additions or deletions, reported once at the top of each
//! added or removed subtree. Paths present on both sides with different
//! hashes are compared field by field. A node missing after and a node
//! missing before whose subtrees share a hash that occurs exactly once on
//! each side are collapsed into a move, even when the destination sits
//! inside a newly added parent. Nothing inside a moved subtree is reported
//! separately.
//!
//! Move detection is best-effort. Reordering siblings keeps every path
//! present on both sides, so a swap surfaces as field-level modifications
//! of the swapped descendants rather than as moves, and subtrees whose hash
//! occurs more than once on either side are never matched.

use std::collections::{BTreeMap, BTreeSet};

use dsnap_types::{parent_path, NodeHash, SerializedNode};

use crate::change::{Change, ChangeKind, ChangeSummary};
use crate::field_diff::diff_fields;
use crate::flatten::{flatten, FlatTree};

/// The result of comparing two trees.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeDiff {
    /// Changes ordered by path (moves by source path).
    pub changes: Vec<Change>,
}

impl TreeDiff {
    /// Create an empty tree diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Per-kind counts.
    pub fn summary(&self) -> ChangeSummary {
        ChangeSummary::from_changes(&self.changes)
    }

    /// Changes of one kind, in order.
    pub fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &Change> {
        self.changes.iter().filter(move |c| c.kind() == kind)
    }
}

/// Compare two trees.
pub fn diff_nodes(before: &SerializedNode, after: &SerializedNode) -> TreeDiff {
    diff_trees(Some(before), Some(after))
}

/// Compare two trees where either side may be empty (`None`).
pub fn diff_trees(before: Option<&SerializedNode>, after: Option<&SerializedNode>) -> TreeDiff {
    let before_map = before.map(flatten).unwrap_or_default();
    let after_map = after.map(flatten).unwrap_or_default();
    diff_flat(&before_map, &after_map)
}

fn diff_flat(before: &FlatTree<'_>, after: &FlatTree<'_>) -> TreeDiff {
    let mut changes = Vec::new();

    // Find modified nodes and every path missing on the other side.
    // Equal hashes short-circuit.
    let mut removed: BTreeSet<&str> = BTreeSet::new();
    for (&path, &old) in before {
        match after.get(path) {
            Some(&new) => {
                if old.hash != new.hash {
                    changes.extend(diff_fields(path, old, new));
                }
            }
            None => {
                removed.insert(path);
            }
        }
    }
    let inserted: BTreeSet<&str> = after
        .keys()
        .copied()
        .filter(|path| !before.contains_key(path))
        .collect();

    // Move candidates: a hash seen exactly once on each side, at a removed
    // path before and an inserted path after.
    let before_groups = group_by_hash(before);
    let after_groups = group_by_hash(after);
    let mut candidates: Vec<(&str, &str, NodeHash)> = Vec::new();
    for (hash, from_paths) in &before_groups {
        let ([from], Some([to])) = (
            from_paths.as_slice(),
            after_groups.get(hash).map(Vec::as_slice),
        ) else {
            continue;
        };
        if removed.contains(from) && inserted.contains(to) {
            candidates.push((*from, *to, *hash));
        }
    }

    // A candidate nested under another candidate on either side is carried
    // by the outer move.
    let candidate_from: BTreeSet<&str> = candidates.iter().map(|&(f, _, _)| f).collect();
    let candidate_to: BTreeSet<&str> = candidates.iter().map(|&(_, t, _)| t).collect();
    let mut moved_from: BTreeSet<&str> = BTreeSet::new();
    let mut moved_to: BTreeSet<&str> = BTreeSet::new();
    for (from, to, hash) in candidates {
        if has_ancestor_in(from, &candidate_from) || has_ancestor_in(to, &candidate_to) {
            continue;
        }
        moved_from.insert(from);
        moved_to.insert(to);
        changes.push(Change::Move {
            from_path: from.to_string(),
            to_path: to.to_string(),
            hash,
            description: format!("Moved {} from {} to {}", before[from].describe(), from, to),
        });
    }

    // Unmatched nodes are reported once, at the top of each missing subtree,
    // unless they travel with a move.
    for path in removed {
        if is_subtree_top(path, after) && !is_within(path, &moved_from) {
            let node = before[path];
            changes.push(Change::Deletion {
                path: path.to_string(),
                node: node.clone(),
                description: format!("Removed {} from {}", node.describe(), path),
            });
        }
    }

    for path in inserted {
        if is_subtree_top(path, before) && !is_within(path, &moved_to) {
            let node = after[path];
            changes.push(Change::Addition {
                path: path.to_string(),
                node: node.clone(),
                description: format!("Added {} at {}", node.describe(), path),
            });
        }
    }

    changes.sort_by(|a, b| a.sort_path().cmp(b.sort_path()));

    TreeDiff { changes }
}

/// A node missing from `other` is the top of a missing subtree when its
/// parent is still present there (or it is the root).
fn is_subtree_top(path: &str, other: &FlatTree<'_>) -> bool {
    match parent_path(path) {
        Some(parent) => other.contains_key(parent),
        None => true,
    }
}

/// `true` if a proper ancestor of `path` is in `set`.
fn has_ancestor_in(path: &str, set: &BTreeSet<&str>) -> bool {
    let mut current = path;
    while let Some(parent) = parent_path(current) {
        if set.contains(parent) {
            return true;
        }
        current = parent;
    }
    false
}

/// `true` if `path` or one of its ancestors is in `set`.
fn is_within(path: &str, set: &BTreeSet<&str>) -> bool {
    set.contains(path) || has_ancestor_in(path, set)
}

fn group_by_hash<'a>(flat: &FlatTree<'a>) -> BTreeMap<NodeHash, Vec<&'a str>> {
    let mut groups: BTreeMap<NodeHash, Vec<&'a str>> = BTreeMap::new();
    for (&path, node) in flat {
        groups.entry(node.hash).or_default().push(path);
    }
    groups
}
