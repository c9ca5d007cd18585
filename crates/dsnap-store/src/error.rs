use dsnap_types::SnapshotId;

/// Errors from snapshot store operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// The requested snapshot is not (or no longer) stored.
    #[error("snapshot not found: {0}")]
    NotFound(SnapshotId),

    /// A store must be able to hold at least one snapshot.
    #[error("invalid store capacity: {0}")]
    InvalidCapacity(usize),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
