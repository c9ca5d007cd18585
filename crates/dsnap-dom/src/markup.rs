//! JSON description of a document tree.
//!
//! An element is `{"tag": "div", "attributes": {...}, "children": [...]}`, a
//! text node is `{"text": "..."}` and a comment is `{"comment": "..."}`.
//! A file is either a bare element or `{"metadata": {...}, "root": ...}`.

use std::collections::BTreeMap;

use dsnap_types::SnapshotMetadata;
use serde::{Deserialize, Serialize};

use crate::error::{DomError, DomResult};

/// One node of a markup tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Markup {
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attributes: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Markup>,
    },
    Text {
        text: String,
    },
    Comment {
        comment: String,
    },
}

impl Markup {
    /// An element with no attributes or children.
    pub fn element(tag: impl Into<String>) -> Self {
        Markup::Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Markup::Text { text: text.into() }
    }

    pub fn comment(comment: impl Into<String>) -> Self {
        Markup::Comment {
            comment: comment.into(),
        }
    }

    /// Set an attribute. No-op on text and comment nodes.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Markup::Element { attributes, .. } = &mut self {
            attributes.insert(name.into(), value.into());
        }
        self
    }

    /// Append a child. No-op on text and comment nodes.
    pub fn child(mut self, child: Markup) -> Self {
        if let Markup::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    /// Append several children.
    pub fn children(self, children: impl IntoIterator<Item = Markup>) -> Self {
        children.into_iter().fold(self, Markup::child)
    }

    /// Parse a single markup node from JSON.
    pub fn from_json(json: &str) -> DomResult<Self> {
        serde_json::from_str(json).map_err(|e| DomError::Markup(e.to_string()))
    }
}

/// Top-level markup file: a root element plus optional host metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkupFile {
    Document {
        #[serde(default)]
        metadata: SnapshotMetadata,
        root: Markup,
    },
    Bare(Markup),
}

impl MarkupFile {
    pub fn from_json(json: &str) -> DomResult<Self> {
        serde_json::from_str(json).map_err(|e| DomError::Markup(e.to_string()))
    }

    pub fn root(&self) -> &Markup {
        match self {
            MarkupFile::Document { root, .. } => root,
            MarkupFile::Bare(root) => root,
        }
    }

    pub fn metadata(&self) -> SnapshotMetadata {
        match self {
            MarkupFile::Document { metadata, .. } => metadata.clone(),
            MarkupFile::Bare(_) => SnapshotMetadata::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_element_tree() {
        let m = Markup::from_json(
            r#"{"tag": "ul", "children": [{"tag": "li", "children": [{"text": "A"}]}]}"#,
        )
        .unwrap();
        let expected = Markup::element("ul").child(Markup::element("li").child(Markup::text("A")));
        assert_eq!(m, expected);
    }

    #[test]
    fn parse_comment() {
        let m = Markup::from_json(r#"{"comment": "note"}"#).unwrap();
        assert_eq!(m, Markup::comment("note"));
    }

    #[test]
    fn parse_document_with_metadata() {
        let f = MarkupFile::from_json(
            r#"{"metadata": {"url": "https://example.test", "viewport": {"width": 800, "height": 600}},
                "root": {"tag": "body"}}"#,
        )
        .unwrap();
        assert_eq!(f.root(), &Markup::element("body"));
        let meta = f.metadata();
        assert_eq!(meta.url.as_deref(), Some("https://example.test"));
        assert_eq!(meta.viewport.map(|v| v.width), Some(800));
    }

    #[test]
    fn parse_bare_file() {
        let f = MarkupFile::from_json(r#"{"tag": "div", "attributes": {"id": "x"}}"#).unwrap();
        assert_eq!(f.root(), &Markup::element("div").attr("id", "x"));
        assert_eq!(f.metadata(), SnapshotMetadata::default());
    }

    #[test]
    fn invalid_json_is_markup_error() {
        assert!(matches!(
            MarkupFile::from_json("{not json"),
            Err(DomError::Markup(_))
        ));
    }

    #[test]
    fn builders_ignore_non_elements() {
        let t = Markup::text("x").attr("id", "y").child(Markup::element("b"));
        assert_eq!(t, Markup::text("x"));
    }
}
