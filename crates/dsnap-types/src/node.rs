use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hash::NodeHash;

/// Tag name recorded for text nodes.
pub const TEXT_TAG: &str = "text";

/// One node of a captured tree.
///
/// Serialized nodes are immutable values: the `hash` is computed bottom-up
/// when the node is built and covers the node's own fields plus the hashes of
/// all children in document order. `path` is not part of the hash, so two
/// identical subtrees at different positions share a hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedNode {
    /// Position of this node in its snapshot (see [`crate::path`]).
    pub path: String,
    /// Lower-cased tag name, or [`TEXT_TAG`] for text nodes.
    pub tag_name: String,
    /// Value of the `id` attribute, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Value of the `class` attribute, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// All attributes, key-sorted.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Trimmed text for text nodes; absent for elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    /// Child nodes in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SerializedNode>,
    /// Structural hash of this subtree.
    pub hash: NodeHash,
}

impl SerializedNode {
    /// Returns `true` if this node was captured from a text node.
    pub fn is_text(&self) -> bool {
        self.text_content.is_some() && self.tag_name == TEXT_TAG
    }

    /// Returns `true` if this node was captured from an element.
    pub fn is_element(&self) -> bool {
        !self.is_text()
    }

    /// Iterate over this node and all descendants in pre-order.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Number of element nodes in this subtree (text nodes excluded).
    pub fn element_count(&self) -> usize {
        self.iter().filter(|n| n.is_element()).count()
    }

    /// Total number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// A short human-readable label: `<tag#id.class>` or `"text"`.
    pub fn describe(&self) -> String {
        if let Some(text) = &self.text_content {
            return format!("text {:?}", abbreviate(text, 32));
        }
        let mut label = format!("<{}", self.tag_name);
        if let Some(id) = &self.id {
            label.push('#');
            label.push_str(id);
        }
        if let Some(class) = &self.class_name {
            for c in class.split_whitespace() {
                label.push('.');
                label.push_str(c);
            }
        }
        label.push('>');
        label
    }
}

/// Pre-order iterator over a serialized tree.
pub struct PreOrder<'a> {
    stack: Vec<&'a SerializedNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a SerializedNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

fn abbreviate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}
