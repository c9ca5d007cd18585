//! Diff engine for dsnap.
//!
//! Compares two serialized trees and classifies every difference as an
//! addition, deletion, field-level modification, or move.
//!
//! # Key Types
//!
//! - [`flatten`] -- Path-indexed view of a tree for O(log n) lookups
//! - [`TreeDiff`] / [`Change`] -- Ordered change list between two trees
//! - [`ChangeSummary`] -- Per-kind change counts
//! - [`DiffResult`] -- Comparison of two snapshots, with timing
//! - [`Property`] -- Which field a modification touched

pub mod change;
pub mod field_diff;
pub mod flatten;
pub mod result;
pub mod tree_diff;

pub use change::{Change, ChangeKind, ChangeSummary, Property, PropertyParseError};
pub use field_diff::diff_fields;
pub use flatten::{flatten, FlatTree};
pub use result::DiffResult;
pub use tree_diff::{diff_nodes, diff_trees, TreeDiff};
