use std::collections::BTreeMap;
use std::hash::Hasher;

use dsnap_types::{NodeHash, SerializedNode};

use crate::fnv::Fnv1aHasher;

/// The fields of one node that feed its structural hash.
///
/// `path` is deliberately absent: identical subtrees hash identically
/// wherever they sit.
#[derive(Clone, Copy, Debug)]
pub struct NodeFields<'a> {
    pub tag_name: &'a str,
    pub id: Option<&'a str>,
    pub class_name: Option<&'a str>,
    pub attributes: &'a BTreeMap<String, String>,
    pub text_content: Option<&'a str>,
    /// Child hashes in document order.
    pub child_hashes: &'a [NodeHash],
}

/// Domain-separated structural hasher.
///
/// Each hasher carries a domain tag that is prepended to every computation,
/// so digests from different encodings never compare equal by accident.
/// Fields are length-prefixed and options are tagged, so `("ab", "c")` and
/// `("a", "bc")` or `None` and `Some("")` cannot alias.
pub struct StructuralHasher {
    domain: &'static str,
}

impl StructuralHasher {
    /// Hasher for serialized DOM nodes.
    pub const NODE: Self = Self {
        domain: "dsnap-node-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }

    /// Hash a node's canonical field tuple.
    pub fn hash_fields(&self, fields: &NodeFields<'_>) -> NodeHash {
        let mut h = Fnv1aHasher::new();
        h.write(self.domain.as_bytes());
        h.write(b":");

        write_str(&mut h, fields.tag_name);
        write_opt(&mut h, fields.id);
        write_opt(&mut h, fields.class_name);

        h.write_u64(fields.attributes.len() as u64);
        for (key, value) in fields.attributes {
            write_str(&mut h, key);
            write_str(&mut h, value);
        }

        write_opt(&mut h, fields.text_content);

        h.write_u64(fields.child_hashes.len() as u64);
        for child in fields.child_hashes {
            h.write(&child.to_bytes());
        }

        NodeHash::from_u64(h.finish())
    }

    /// Recompute a node's hash from its fields and its children's stored
    /// hashes. Children are not re-verified.
    pub fn hash_node(&self, node: &SerializedNode) -> NodeHash {
        let child_hashes: Vec<NodeHash> = node.children.iter().map(|c| c.hash).collect();
        self.hash_fields(&NodeFields {
            tag_name: &node.tag_name,
            id: node.id.as_deref(),
            class_name: node.class_name.as_deref(),
            attributes: &node.attributes,
            text_content: node.text_content.as_deref(),
            child_hashes: &child_hashes,
        })
    }

    /// Check every stored hash in a tree against a recomputation.
    ///
    /// Returns the first mismatch in pre-order.
    pub fn verify_tree(&self, root: &SerializedNode) -> Result<(), HashMismatch> {
        for node in root.iter() {
            let computed = self.hash_node(node);
            if computed != node.hash {
                return Err(HashMismatch {
                    path: node.path.clone(),
                    stored: node.hash,
                    computed,
                });
            }
        }
        Ok(())
    }
}

/// A stored node hash that does not match its fields.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("hash mismatch at {path:?}: stored {stored}, computed {computed}")]
pub struct HashMismatch {
    pub path: String,
    pub stored: NodeHash,
    pub computed: NodeHash,
}

fn write_str(h: &mut Fnv1aHasher, s: &str) {
    h.write_u64(s.len() as u64);
    h.write(s.as_bytes());
}

fn write_opt(h: &mut Fnv1aHasher, s: Option<&str>) {
    match s {
        Some(s) => {
            h.write_u8(1);
            write_str(h, s);
        }
        None => h.write_u8(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn element_fields<'a>(
        tag: &'a str,
        attributes: &'a BTreeMap<String, String>,
        children: &'a [NodeHash],
    ) -> NodeFields<'a> {
        NodeFields {
            tag_name: tag,
            id: None,
            class_name: None,
            attributes,
            text_content: None,
            child_hashes: children,
        }
    }

    fn make_node(path: &str, tag: &str, children: Vec<SerializedNode>) -> SerializedNode {
        let mut node = SerializedNode {
            path: path.into(),
            tag_name: tag.into(),
            id: None,
            class_name: None,
            attributes: BTreeMap::new(),
            text_content: None,
            children,
            hash: NodeHash::default(),
        };
        node.hash = StructuralHasher::NODE.hash_node(&node);
        node
    }

    #[test]
    fn hash_is_deterministic() {
        let a = attrs(&[("href", "/x")]);
        let f = element_fields("a", &a, &[]);
        assert_eq!(
            StructuralHasher::NODE.hash_fields(&f),
            StructuralHasher::NODE.hash_fields(&f)
        );
    }

    #[test]
    fn attribute_values_matter() {
        let a = attrs(&[("class", "a")]);
        let b = attrs(&[("class", "b")]);
        assert_ne!(
            StructuralHasher::NODE.hash_fields(&element_fields("div", &a, &[])),
            StructuralHasher::NODE.hash_fields(&element_fields("div", &b, &[]))
        );
    }

    #[test]
    fn child_order_matters() {
        let empty = BTreeMap::new();
        let x = NodeHash::from_u64(1);
        let y = NodeHash::from_u64(2);
        let xy = [x, y];
        let yx = [y, x];
        assert_ne!(
            StructuralHasher::NODE.hash_fields(&element_fields("ul", &empty, &xy)),
            StructuralHasher::NODE.hash_fields(&element_fields("ul", &empty, &yx))
        );
    }

    #[test]
    fn none_and_empty_do_not_alias() {
        let empty = BTreeMap::new();
        let mut with_none = element_fields("p", &empty, &[]);
        with_none.id = None;
        let mut with_empty = with_none;
        with_empty.id = Some("");
        assert_ne!(
            StructuralHasher::NODE.hash_fields(&with_none),
            StructuralHasher::NODE.hash_fields(&with_empty)
        );
    }

    #[test]
    fn field_boundaries_do_not_alias() {
        let ab_c = attrs(&[("ab", "c")]);
        let a_bc = attrs(&[("a", "bc")]);
        assert_ne!(
            StructuralHasher::NODE.hash_fields(&element_fields("p", &ab_c, &[])),
            StructuralHasher::NODE.hash_fields(&element_fields("p", &a_bc, &[]))
        );
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let empty = BTreeMap::new();
        let f = element_fields("div", &empty, &[]);
        let custom = StructuralHasher::new("custom-v1");
        assert_ne!(custom.hash_fields(&f), StructuralHasher::NODE.hash_fields(&f));
        assert_eq!(custom.domain(), "custom-v1");
    }

    #[test]
    fn path_does_not_affect_hash() {
        let a = make_node("/0", "li", vec![]);
        let b = make_node("/7/3", "li", vec![]);
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn verify_tree_accepts_consistent_tree() {
        let tree = make_node("", "ul", vec![make_node("/0", "li", vec![])]);
        assert!(StructuralHasher::NODE.verify_tree(&tree).is_ok());
    }

    #[test]
    fn verify_tree_reports_tampered_node() {
        let mut tree = make_node("", "ul", vec![make_node("/0", "li", vec![])]);
        tree.children[0].tag_name = "p".into();
        let err = StructuralHasher::NODE.verify_tree(&tree).unwrap_err();
        // The root's stored hash still covers the old child hash, so the
        // root itself checks out and the child is reported.
        assert_eq!(err.path, "/0");
    }
}
