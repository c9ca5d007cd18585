use std::collections::BTreeMap;

use dsnap_hash::{NodeFields, StructuralHasher};
use dsnap_types::{child_path, NodeHash, SerializedNode, ROOT_PATH, TEXT_TAG};
use tracing::debug;

use crate::error::{DomError, DomResult};
use crate::reader::{DomReader, NodeView};

/// Capture the subtree under `root` as an immutable hashed tree.
///
/// The walk is depth-first and pre-order. Elements keep their lower-cased
/// tag, `id` and `class` attributes and the full attribute map. Text nodes
/// are kept only when their trimmed content is non-empty, and store the
/// trimmed string. Every other node kind is skipped, and skipped nodes do not
/// consume a child index, so paths stay dense. Hashes are computed after a
/// node's children.
///
/// The root must be an element.
pub fn serialize<R: DomReader>(reader: &R, root: &R::Handle) -> DomResult<SerializedNode> {
    match reader.read(root)? {
        NodeView::Element {
            tag_name,
            attributes,
            children,
        } => {
            let node = serialize_element(
                reader,
                ROOT_PATH.to_string(),
                &tag_name,
                attributes,
                &children,
            )?;
            debug!(
                nodes = node.node_count(),
                root_hash = %node.hash.short_hex(),
                "serialized subtree"
            );
            Ok(node)
        }
        NodeView::Text(_) => Err(DomError::NotAnElement { found: "text" }),
        NodeView::Other => Err(DomError::NotAnElement { found: "other" }),
    }
}

fn serialize_element<R: DomReader>(
    reader: &R,
    path: String,
    tag_name: &str,
    attributes: Vec<(String, String)>,
    children: &[R::Handle],
) -> DomResult<SerializedNode> {
    let attributes: BTreeMap<String, String> = attributes.into_iter().collect();

    let mut serialized_children = Vec::with_capacity(children.len());
    for handle in children {
        let slot_path = child_path(&path, serialized_children.len());
        match reader.read(handle)? {
            NodeView::Element {
                tag_name,
                attributes,
                children,
            } => {
                serialized_children.push(serialize_element(
                    reader, slot_path, &tag_name, attributes, &children,
                )?);
            }
            NodeView::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    serialized_children.push(text_node(slot_path, trimmed));
                }
            }
            NodeView::Other => {}
        }
    }

    let tag_name = tag_name.to_lowercase();
    let id = attributes.get("id").cloned();
    let class_name = attributes.get("class").cloned();
    let child_hashes: Vec<NodeHash> = serialized_children.iter().map(|c| c.hash).collect();
    let hash = StructuralHasher::NODE.hash_fields(&NodeFields {
        tag_name: &tag_name,
        id: id.as_deref(),
        class_name: class_name.as_deref(),
        attributes: &attributes,
        text_content: None,
        child_hashes: &child_hashes,
    });

    Ok(SerializedNode {
        path,
        tag_name,
        id,
        class_name,
        attributes,
        text_content: None,
        children: serialized_children,
        hash,
    })
}

fn text_node(path: String, text: &str) -> SerializedNode {
    let attributes = BTreeMap::new();
    let hash = StructuralHasher::NODE.hash_fields(&NodeFields {
        tag_name: TEXT_TAG,
        id: None,
        class_name: None,
        attributes: &attributes,
        text_content: Some(text),
        child_hashes: &[],
    });
    SerializedNode {
        path,
        tag_name: TEXT_TAG.to_string(),
        id: None,
        class_name: None,
        attributes,
        text_content: Some(text.to_string()),
        children: Vec::new(),
        hash,
    }
}
