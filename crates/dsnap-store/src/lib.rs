//! Snapshot storage for dsnap.
//!
//! Snapshots are immutable once stored and are handed out as
//! `Arc<Snapshot>`, so a diff can keep referring to a snapshot after the
//! store has evicted it.
//!
//! # Storage Backends
//!
//! All backends implement the [`SnapshotStore`] trait:
//!
//! - [`InMemorySnapshotStore`] -- bounded store that evicts the oldest
//!   snapshot once its capacity is exceeded
//!
//! # Design Rules
//!
//! 1. Snapshots are never mutated after insertion.
//! 2. Creation order is id order: ids come from a monotonic counter.
//! 3. The store never holds more snapshots than its capacity.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::{InMemorySnapshotStore, DEFAULT_CAPACITY};
pub use traits::SnapshotStore;
