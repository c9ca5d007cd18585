use dsnap_types::SnapshotMetadata;

use crate::error::DomResult;

/// What a reader exposes about one live node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeView<H> {
    /// An element with its attributes (in document order) and child handles.
    Element {
        tag_name: String,
        attributes: Vec<(String, String)>,
        children: Vec<H>,
    },
    /// A text node with its raw (untrimmed) content.
    Text(String),
    /// Any other node kind (comments, processing instructions, doctype...).
    /// The serializer skips these.
    Other,
}

/// Read-only access to a host's live document tree.
///
/// Implemented by the hosting layer (a real browser DOM binding, or the
/// in-memory [`crate::Document`]). The serializer only ever calls [`read`]
/// on handles it received from the root or from a previous `read`.
///
/// [`read`]: DomReader::read
pub trait DomReader {
    /// Opaque node reference.
    type Handle: Clone;

    /// Describe one node.
    ///
    /// Returns `Err` if the handle is stale or otherwise inaccessible.
    fn read(&self, handle: &Self::Handle) -> DomResult<NodeView<Self::Handle>>;

    /// Host metadata recorded with snapshots taken from this reader.
    fn metadata(&self) -> SnapshotMetadata {
        SnapshotMetadata::default()
    }
}
