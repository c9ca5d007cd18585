use std::fmt;

use dsnap_types::{child_path, SnapshotMetadata, ROOT_PATH};
use tracing::debug;

use crate::error::{DomError, DomResult};
use crate::markup::{Markup, MarkupFile};
use crate::mutation::{MutationKind, MutationLog, MutationLogConfig, MutationRecord};
use crate::reader::{DomReader, NodeView};

/// Handle to a node inside a [`Document`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Clone, Debug)]
enum NodeData {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

impl NodeData {
    fn kind_name(&self) -> &'static str {
        match self {
            NodeData::Element { .. } => "element",
            NodeData::Text(_) => "text",
            NodeData::Comment(_) => "comment",
        }
    }
}

#[derive(Clone, Debug)]
struct NodeSlot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed, mutable document tree.
///
/// Nodes are never freed: removing a node detaches it, and its handle stays
/// valid. Attributes keep insertion order, as a live DOM does. Mutations made
/// through this API are recorded while tracking is enabled.
#[derive(Clone)]
pub struct Document {
    nodes: Vec<NodeSlot>,
    root: NodeId,
    metadata: SnapshotMetadata,
    tracking: Option<MutationLog>,
}

impl Document {
    /// Create a document whose root is an empty element.
    pub fn new(root_tag: impl Into<String>) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            metadata: SnapshotMetadata::default(),
            tracking: None,
        };
        doc.root = doc.create_element(root_tag);
        doc
    }

    /// Build a document from a markup tree. The root must be an element.
    pub fn from_markup(markup: &Markup) -> DomResult<Self> {
        if !matches!(markup, Markup::Element { .. }) {
            return Err(DomError::NotAnElement {
                found: markup_kind(markup),
            });
        }
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            metadata: SnapshotMetadata::default(),
            tracking: None,
        };
        doc.root = doc.build(markup);
        Ok(doc)
    }

    /// Build a document from a markup file, carrying its metadata.
    pub fn from_markup_file(file: &MarkupFile) -> DomResult<Self> {
        let mut doc = Self::from_markup(file.root())?;
        doc.metadata = file.metadata();
        Ok(doc)
    }

    /// Parse a markup file from JSON.
    pub fn from_json(json: &str) -> DomResult<Self> {
        Self::from_markup_file(&MarkupFile::from_json(json)?)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn metadata(&self) -> &SnapshotMetadata {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: SnapshotMetadata) {
        self.metadata = metadata;
    }

    /// Number of nodes ever allocated, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ---- Construction ----

    /// Allocate a detached element.
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Element {
            tag: tag.into(),
            attributes: Vec::new(),
        })
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    /// Allocate a detached comment node.
    pub fn create_comment(&mut self, comment: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Comment(comment.into()))
    }

    /// Allocate a detached subtree from markup and return its top node.
    pub fn build(&mut self, markup: &Markup) -> NodeId {
        match markup {
            Markup::Element {
                tag,
                attributes,
                children,
            } => {
                let id = self.alloc(NodeData::Element {
                    tag: tag.clone(),
                    attributes: attributes
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                });
                for child in children {
                    let c = self.build(child);
                    self.nodes[c.0].parent = Some(id);
                    self.nodes[id.0].children.push(c);
                }
                id
            }
            Markup::Text { text } => self.create_text(text.clone()),
            Markup::Comment { comment } => self.create_comment(comment.clone()),
        }
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeSlot {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn slot(&self, id: NodeId) -> DomResult<&NodeSlot> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| DomError::InvalidHandle(id.to_string()))
    }

    fn slot_mut(&mut self, id: NodeId) -> DomResult<&mut NodeSlot> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| DomError::InvalidHandle(id.to_string()))
    }

    // ---- Queries ----

    pub fn parent(&self, id: NodeId) -> DomResult<Option<NodeId>> {
        Ok(self.slot(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> DomResult<&[NodeId]> {
        Ok(&self.slot(id)?.children)
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> DomResult<Option<&str>> {
        match &self.slot(id)?.data {
            NodeData::Element { attributes, .. } => Ok(attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())),
            other => Err(DomError::NotAnElement {
                found: other.kind_name(),
            }),
        }
    }

    /// Character data of a text or comment node (`None` for elements), like
    /// the DOM's `nodeValue`.
    pub fn node_value(&self, id: NodeId) -> DomResult<Option<&str>> {
        Ok(match &self.slot(id)?.data {
            NodeData::Element { .. } => None,
            NodeData::Text(t) | NodeData::Comment(t) => Some(t.as_str()),
        })
    }

    /// First attached element (pre-order from the root) whose `id` attribute
    /// equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            let slot = &self.nodes[node.0];
            if let NodeData::Element { attributes, .. } = &slot.data {
                if attributes.iter().any(|(k, v)| k == "id" && v == id) {
                    return Some(node);
                }
            }
            stack.extend(slot.children.iter().rev());
        }
        None
    }

    /// Position path of a node, counting only siblings the serializer keeps
    /// (elements and non-blank text). Detached nodes get a path relative to
    /// the top of their detached subtree.
    pub fn path_of(&self, id: NodeId) -> DomResult<String> {
        let mut steps = Vec::new();
        let mut current = id;
        while let Some(parent) = self.slot(current)?.parent {
            let index = self.nodes[parent.0]
                .children
                .iter()
                .take_while(|&&c| c != current)
                .filter(|&&c| self.is_kept(c))
                .count();
            steps.push(index);
            current = parent;
        }
        Ok(steps
            .iter()
            .rev()
            .fold(ROOT_PATH.to_string(), |path, &i| child_path(&path, i)))
    }

    fn is_kept(&self, id: NodeId) -> bool {
        match &self.nodes[id.0].data {
            NodeData::Element { .. } => true,
            NodeData::Text(t) => !t.trim().is_empty(),
            NodeData::Comment(_) => false,
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes[node.0].parent {
                Some(p) => node = p,
                None => return false,
            }
        }
    }

    // ---- Mutation ----

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let index = self.children(parent)?.len();
        self.insert_child(parent, index, child)
    }

    /// Insert `child` at `index` among `parent`'s children (clamped to the
    /// end), detaching it from any previous parent first.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> DomResult<()> {
        self.slot(child)?;
        let kind = self.slot(parent)?.data.kind_name();
        if kind != "element" {
            return Err(DomError::NotAnElement { found: kind });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(DomError::HierarchyCycle {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }
        if let Some(old_parent) = self.nodes[child.0].parent {
            self.remove_child(old_parent, child)?;
        }
        let siblings = &mut self.nodes[parent.0].children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        self.record(parent, MutationKind::ChildList, None, None);
        Ok(())
    }

    /// Detach `child` from `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let pos = self
            .slot(parent)?
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or_else(|| DomError::NotAChild {
                parent: parent.to_string(),
                child: child.to_string(),
            })?;
        // Record before detaching so the target path is still meaningful.
        self.record(parent, MutationKind::ChildList, None, None);
        self.nodes[parent.0].children.remove(pos);
        self.nodes[child.0].parent = None;
        Ok(())
    }

    /// Set or replace an attribute value.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> DomResult<()> {
        let name = name.into();
        let value = value.into();
        let old = match &mut self.slot_mut(id)?.data {
            NodeData::Element { attributes, .. } => {
                match attributes.iter_mut().find(|(k, _)| *k == name) {
                    Some((_, v)) => Some(std::mem::replace(v, value)),
                    None => {
                        attributes.push((name.clone(), value));
                        None
                    }
                }
            }
            other => {
                return Err(DomError::NotAnElement {
                    found: other.kind_name(),
                })
            }
        };
        self.record(id, MutationKind::Attributes, Some(name), old);
        Ok(())
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<Option<String>> {
        let old = match &mut self.slot_mut(id)?.data {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .position(|(k, _)| k == name)
                .map(|pos| attributes.remove(pos).1),
            other => {
                return Err(DomError::NotAnElement {
                    found: other.kind_name(),
                })
            }
        };
        if old.is_some() {
            self.record(id, MutationKind::Attributes, Some(name.to_string()), old.clone());
        }
        Ok(old)
    }

    /// Replace a text node's content.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> DomResult<()> {
        let old = match &mut self.slot_mut(id)?.data {
            NodeData::Text(t) => std::mem::replace(t, text.into()),
            other => {
                return Err(DomError::NotAText {
                    found: other.kind_name(),
                })
            }
        };
        self.record(id, MutationKind::CharacterData, None, Some(old));
        Ok(())
    }

    // ---- Mutation tracking ----

    /// Start recording mutations into a fresh log. Replaces any active log.
    pub fn start_tracking(&mut self, config: MutationLogConfig) {
        debug!(
            max_records = config.max_records,
            retain_records = config.retain_records,
            "mutation tracking started"
        );
        self.tracking = Some(MutationLog::new(config));
    }

    /// Stop recording and hand back the log.
    pub fn stop_tracking(&mut self) -> Option<MutationLog> {
        let log = self.tracking.take();
        if let Some(log) = &log {
            debug!(recorded = log.total_recorded(), "mutation tracking stopped");
        }
        log
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking.is_some()
    }

    pub fn mutation_log(&self) -> Option<&MutationLog> {
        self.tracking.as_ref()
    }

    fn record(
        &mut self,
        target: NodeId,
        kind: MutationKind,
        attribute: Option<String>,
        old_value: Option<String>,
    ) {
        if self.tracking.is_none() {
            return;
        }
        let Ok(path) = self.path_of(target) else {
            return;
        };
        let mut record = MutationRecord::new(kind, path).with_old_value(old_value);
        record.attribute_name = attribute;
        if let Some(log) = self.tracking.as_mut() {
            log.record(record);
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("node_count", &self.nodes.len())
            .field("root", &self.root)
            .field("tracking", &self.tracking.is_some())
            .finish()
    }
}

impl DomReader for Document {
    type Handle = NodeId;

    fn read(&self, handle: &NodeId) -> DomResult<NodeView<NodeId>> {
        let slot = self.slot(*handle)?;
        Ok(match &slot.data {
            NodeData::Element { tag, attributes } => NodeView::Element {
                tag_name: tag.clone(),
                attributes: attributes.clone(),
                children: slot.children.clone(),
            },
            NodeData::Text(t) => NodeView::Text(t.clone()),
            NodeData::Comment(_) => NodeView::Other,
        })
    }

    fn metadata(&self) -> SnapshotMetadata {
        self.metadata.clone()
    }
}

fn markup_kind(markup: &Markup) -> &'static str {
    match markup {
        Markup::Element { .. } => "element",
        Markup::Text { .. } => "text",
        Markup::Comment { .. } => "comment",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> Document {
        Document::from_markup(
            &Markup::element("ul")
                .child(Markup::element("li").attr("id", "a").child(Markup::text("A")))
                .child(Markup::comment("between"))
                .child(Markup::text("   "))
                .child(Markup::element("li").attr("id", "b").child(Markup::text("B"))),
        )
        .unwrap()
    }

    #[test]
    fn from_markup_rejects_text_root() {
        let err = Document::from_markup(&Markup::text("x")).unwrap_err();
        assert_eq!(err, DomError::NotAnElement { found: "text" });
    }

    #[test]
    fn node_value_reads_text_and_comments() {
        let doc = list();
        let children = doc.children(doc.root()).unwrap();
        assert_eq!(doc.node_value(children[0]).unwrap(), None);
        assert_eq!(doc.node_value(children[1]).unwrap(), Some("between"));
        assert_eq!(doc.node_value(children[2]).unwrap(), Some("   "));
    }

    #[test]
    fn path_skips_comments_and_blank_text() {
        let doc = list();
        let b = doc.find_by_id("b").unwrap();
        assert_eq!(doc.path_of(b).unwrap(), "/1");
        assert_eq!(doc.path_of(doc.root()).unwrap(), "");
    }

    #[test]
    fn append_moves_node_between_parents() {
        let mut doc = list();
        let a = doc.find_by_id("a").unwrap();
        let b = doc.find_by_id("b").unwrap();
        doc.append_child(b, a).unwrap();
        assert_eq!(doc.parent(a).unwrap(), Some(b));
        assert!(!doc.children(doc.root()).unwrap().contains(&a));
    }

    #[test]
    fn cannot_insert_ancestor_under_descendant() {
        let mut doc = list();
        let a = doc.find_by_id("a").unwrap();
        let root = doc.root();
        assert!(matches!(
            doc.append_child(a, root),
            Err(DomError::HierarchyCycle { .. })
        ));
    }

    #[test]
    fn cannot_append_to_text() {
        let mut doc = Document::new("div");
        let t = doc.create_text("x");
        let e = doc.create_element("p");
        assert_eq!(
            doc.append_child(t, e),
            Err(DomError::NotAnElement { found: "text" })
        );
    }

    #[test]
    fn remove_child_requires_membership() {
        let mut doc = list();
        let stray = doc.create_element("p");
        let root = doc.root();
        assert!(matches!(
            doc.remove_child(root, stray),
            Err(DomError::NotAChild { .. })
        ));
    }

    #[test]
    fn attributes_set_replace_remove() {
        let mut doc = Document::new("div");
        let root = doc.root();
        doc.set_attribute(root, "class", "a").unwrap();
        doc.set_attribute(root, "class", "b").unwrap();
        assert_eq!(doc.attribute(root, "class").unwrap(), Some("b"));
        assert_eq!(
            doc.remove_attribute(root, "class").unwrap(),
            Some("b".to_string())
        );
        assert_eq!(doc.remove_attribute(root, "class").unwrap(), None);
    }

    #[test]
    fn set_text_requires_text_node() {
        let mut doc = Document::new("div");
        let root = doc.root();
        assert_eq!(
            doc.set_text(root, "x"),
            Err(DomError::NotAText { found: "element" })
        );
    }

    #[test]
    fn reading_unknown_handle_fails() {
        let doc = Document::new("div");
        assert!(matches!(
            doc.read(&NodeId(99)),
            Err(DomError::InvalidHandle(_))
        ));
    }

    #[test]
    fn comments_read_as_other() {
        let mut doc = Document::new("div");
        let c = doc.create_comment("x");
        assert_eq!(doc.read(&c).unwrap(), NodeView::Other);
    }

    #[test]
    fn tracking_records_mutations_with_old_values() {
        let mut doc = list();
        doc.start_tracking(MutationLogConfig::default());
        let a = doc.find_by_id("a").unwrap();
        doc.set_attribute(a, "class", "x").unwrap();
        doc.set_attribute(a, "class", "y").unwrap();
        let text = doc.children(a).unwrap()[0];
        doc.set_text(text, "A2").unwrap();
        let root = doc.root();
        let span = doc.create_element("span");
        doc.append_child(root, span).unwrap();

        let log = doc.mutation_log().unwrap();
        let kinds: Vec<MutationKind> = log.records().iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MutationKind::Attributes,
                MutationKind::Attributes,
                MutationKind::CharacterData,
                MutationKind::ChildList,
            ]
        );
        assert_eq!(log.records()[0].old_value, None);
        assert_eq!(log.records()[1].old_value.as_deref(), Some("x"));
        assert_eq!(log.records()[1].target, "/0");
        assert_eq!(log.records()[2].target, "/0/0");
        assert_eq!(log.records()[2].old_value.as_deref(), Some("A"));
        assert_eq!(log.records()[3].target, "");
    }

    #[test]
    fn no_records_without_tracking() {
        let mut doc = list();
        let root = doc.root();
        doc.set_attribute(root, "x", "1").unwrap();
        assert!(doc.mutation_log().is_none());
        doc.start_tracking(MutationLogConfig::default());
        let log = doc.stop_tracking().unwrap();
        assert!(log.is_empty());
        assert!(!doc.is_tracking());
    }

    #[test]
    fn from_json_carries_metadata() {
        let doc = Document::from_json(
            r#"{"metadata": {"title": "Demo"}, "root": {"tag": "main"}}"#,
        )
        .unwrap();
        assert_eq!(doc.metadata().title.as_deref(), Some("Demo"));
        assert_eq!(DomReader::metadata(&doc).title.as_deref(), Some("Demo"));
    }
}
