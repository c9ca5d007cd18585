//! Foundation types for dsnap.
//!
//! This crate provides the structural data model shared by every other dsnap
//! crate: the immutable serialized tree captured at snapshot time, its
//! structural hash, position paths, and the snapshot record itself.
//!
//! # Key Types
//!
//! - [`SerializedNode`] — One captured element or text node with its subtree
//! - [`NodeHash`] — 64-bit structural hash of a subtree
//! - [`Snapshot`] / [`SnapshotInfo`] — A captured tree plus its metadata
//! - [`SnapshotId`] — Monotonically assigned snapshot identifier
//! - [`SnapshotMetadata`] — Free-form host metadata (URL, title, viewport)

pub mod error;
pub mod hash;
pub mod node;
pub mod path;
pub mod snapshot;

pub use error::TypeError;
pub use hash::NodeHash;
pub use node::{PreOrder, SerializedNode, TEXT_TAG};
pub use path::{child_path, parent_path, path_depth, ROOT_PATH};
pub use snapshot::{Snapshot, SnapshotId, SnapshotInfo, SnapshotMetadata, Viewport};
