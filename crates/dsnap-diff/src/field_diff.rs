//! Field-level comparison of two nodes found at the same path.
//!
//! Only `textContent` and attributes are compared. Tag, id and class are not
//! separate properties: id and class changes surface as attribute changes.

use dsnap_types::SerializedNode;

use crate::change::{Change, Property};

/// Compare the fields of two nodes at `path`.
///
/// Emits one modification for a changed `textContent`, then one per
/// attribute that changed, was removed, or was added, in key order. Callers
/// only invoke this when the two hashes differ.
pub fn diff_fields(path: &str, before: &SerializedNode, after: &SerializedNode) -> Vec<Change> {
    let mut changes = Vec::new();

    if before.text_content != after.text_content {
        changes.push(Change::Modification {
            path: path.to_string(),
            property: Property::TextContent,
            before: before.text_content.clone(),
            after: after.text_content.clone(),
            description: describe_text(
                before.text_content.as_deref(),
                after.text_content.as_deref(),
            ),
        });
    }

    // Check for changed and removed attributes.
    for (name, old_value) in &before.attributes {
        match after.attributes.get(name) {
            Some(new_value) => {
                if old_value != new_value {
                    changes.push(Change::Modification {
                        path: path.to_string(),
                        property: Property::Attribute(name.clone()),
                        before: Some(old_value.clone()),
                        after: Some(new_value.clone()),
                        description: format!(
                            "Attribute \"{name}\" changed from {old_value:?} to {new_value:?}"
                        ),
                    });
                }
            }
            None => {
                changes.push(Change::Modification {
                    path: path.to_string(),
                    property: Property::Attribute(name.clone()),
                    before: Some(old_value.clone()),
                    after: None,
                    description: format!("Attribute \"{name}\" removed (was {old_value:?})"),
                });
            }
        }
    }

    // Check for added attributes.
    for (name, new_value) in &after.attributes {
        if !before.attributes.contains_key(name) {
            changes.push(Change::Modification {
                path: path.to_string(),
                property: Property::Attribute(name.clone()),
                before: None,
                after: Some(new_value.clone()),
                description: format!("Attribute \"{name}\" added with value {new_value:?}"),
            });
        }
    }

    changes
}

fn describe_text(before: Option<&str>, after: Option<&str>) -> String {
    match (before, after) {
        (Some(b), Some(a)) => format!("Text changed from {b:?} to {a:?}"),
        (None, Some(a)) => format!("Text set to {a:?}"),
        (Some(b), None) => format!("Text {b:?} removed"),
        (None, None) => "Text unchanged".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsnap_dom::{serialize, Document, Markup};

    fn capture(markup: Markup) -> SerializedNode {
        let doc = Document::from_markup(&markup).unwrap();
        serialize(&doc, &doc.root()).unwrap()
    }

    #[test]
    fn changed_attribute() {
        let before = capture(Markup::element("div").attr("class", "a"));
        let after = capture(Markup::element("div").attr("class", "b"));
        let changes = diff_fields("", &before, &after);
        assert_eq!(changes.len(), 1);
        match &changes[0] {
            Change::Modification {
                property,
                before,
                after,
                description,
                ..
            } => {
                assert_eq!(property.to_string(), "attribute.class");
                assert_eq!(before.as_deref(), Some("a"));
                assert_eq!(after.as_deref(), Some("b"));
                assert!(description.contains("changed"));
            }
            other => panic!("expected Modification, got {:?}", other),
        }
    }

    #[test]
    fn removed_and_added_attributes_are_distinguished() {
        let before = capture(Markup::element("a").attr("href", "/x"));
        let after = capture(Markup::element("a").attr("title", "t"));
        let changes = diff_fields("/0", &before, &after);
        assert_eq!(changes.len(), 2);
        assert!(changes[0].description().contains("removed"));
        assert_eq!(changes[0].property(), Some(&Property::Attribute("href".into())));
        assert!(changes[1].description().contains("added"));
        assert_eq!(changes[1].property(), Some(&Property::Attribute("title".into())));
    }

    #[test]
    fn text_change_comes_first() {
        let before = capture(Markup::element("p").child(Markup::text("old")));
        let after = capture(Markup::element("p").child(Markup::text("new")));
        let changes = diff_fields("/0", &before.children[0], &after.children[0]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].property(), Some(&Property::TextContent));
        assert_eq!(changes[0].description(), "Text changed from \"old\" to \"new\"");
    }

    #[test]
    fn text_to_element_reports_text_removed() {
        let before = capture(Markup::element("p").child(Markup::text("t")));
        let after = capture(Markup::element("p").child(Markup::element("b")));
        let changes = diff_fields("/0", &before.children[0], &after.children[0]);
        assert_eq!(changes.len(), 1);
        match &changes[0] {
            Change::Modification { before, after, .. } => {
                assert_eq!(before.as_deref(), Some("t"));
                assert_eq!(*after, None);
            }
            other => panic!("expected Modification, got {:?}", other),
        }
    }

    #[test]
    fn tag_change_alone_produces_nothing() {
        let before = capture(Markup::element("p"));
        let after = capture(Markup::element("span"));
        assert!(diff_fields("", &before, &after).is_empty());
    }
}
