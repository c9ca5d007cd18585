//! Position paths.
//!
//! A path encodes a node's position in its snapshot as a chain of child
//! indices from the root: the root is `""`, its first child `"/0"`, that
//! child's third child `"/0/2"`. Paths encode position, not identity.

/// Path of the root node.
pub const ROOT_PATH: &str = "";

/// Path of the `index`-th child of the node at `parent`.
pub fn child_path(parent: &str, index: usize) -> String {
    format!("{parent}/{index}")
}

/// Path of the parent of `path`, or `None` for the root.
pub fn parent_path(path: &str) -> Option<&str> {
    path.rfind('/').map(|i| &path[..i])
}

/// Number of steps from the root (`0` for the root itself).
pub fn path_depth(path: &str) -> usize {
    path.matches('/').count()
}
