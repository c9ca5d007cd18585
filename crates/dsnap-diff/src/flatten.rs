//! Path-indexed view of a serialized tree.

use std::collections::BTreeMap;

use dsnap_types::SerializedNode;

/// Every node of a tree keyed by its path.
pub type FlatTree<'a> = BTreeMap<&'a str, &'a SerializedNode>;

/// Walk `root` in pre-order and index every node by path.
pub fn flatten(root: &SerializedNode) -> FlatTree<'_> {
    root.iter().map(|n| (n.path.as_str(), n)).collect()
}
