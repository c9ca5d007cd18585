use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::node::SerializedNode;

const SNAPSHOT_ID_PREFIX: &str = "snapshot-";

/// Identifier of a captured snapshot.
///
/// Ids are assigned from a monotonically increasing counter owned by the
/// engine, so ordering by id is ordering by creation. The textual form is
/// `snapshot-<n>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SnapshotId(u64);

impl SnapshotId {
    /// Create an id from its sequence number.
    pub const fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// The sequence number.
    pub const fn seq(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnapshotId({})", self.0)
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SNAPSHOT_ID_PREFIX}{}", self.0)
    }
}

impl FromStr for SnapshotId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(SNAPSHOT_ID_PREFIX)
            .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|n| n.parse::<u64>().ok())
            .map(Self)
            .ok_or_else(|| TypeError::InvalidSnapshotId(s.to_string()))
    }
}

impl From<SnapshotId> for String {
    fn from(id: SnapshotId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for SnapshotId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Viewport dimensions reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Free-form host metadata recorded alongside a snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// An immutable captured copy of a document subtree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: SnapshotId,
    pub label: String,
    pub timestamp: DateTime<Utc>,
    pub structure: SerializedNode,
    /// Number of element nodes in `structure`.
    pub element_count: usize,
    pub metadata: SnapshotMetadata,
}

impl Snapshot {
    /// Build a snapshot, deriving `element_count` from the structure.
    pub fn new(
        id: SnapshotId,
        label: impl Into<String>,
        timestamp: DateTime<Utc>,
        structure: SerializedNode,
        metadata: SnapshotMetadata,
    ) -> Self {
        let element_count = structure.element_count();
        Self {
            id,
            label: label.into(),
            timestamp,
            structure,
            element_count,
            metadata,
        }
    }

    /// The snapshot record without its structure payload.
    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            id: self.id,
            label: self.label.clone(),
            timestamp: self.timestamp,
            element_count: self.element_count,
            metadata: self.metadata.clone(),
        }
    }
}

/// Snapshot listing entry: everything but the captured tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotInfo {
    pub id: SnapshotId,
    pub label: String,
    pub timestamp: DateTime<Utc>,
    pub element_count: usize,
    pub metadata: SnapshotMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::NodeHash;

    fn leaf() -> SerializedNode {
        SerializedNode {
            path: String::new(),
            tag_name: "div".into(),
            id: None,
            class_name: None,
            attributes: BTreeMap::new(),
            text_content: None,
            children: vec![],
            hash: NodeHash::from_u64(7),
        }
    }

    #[test]
    fn id_display_and_parse() {
        let id = SnapshotId::new(42);
        assert_eq!(id.to_string(), "snapshot-42");
        assert_eq!("snapshot-42".parse::<SnapshotId>().unwrap(), id);
    }

    #[test]
    fn id_parse_rejects_foreign_forms() {
        for bad in ["42", "snapshot-", "snapshot-x", "missing-1", "", "snapshot-+1", "snapshot- 1"] {
            assert!(
                matches!(bad.parse::<SnapshotId>(), Err(TypeError::InvalidSnapshotId(_))),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn ids_order_by_sequence() {
        assert!(SnapshotId::new(2) < SnapshotId::new(10));
    }

    #[test]
    fn id_serializes_as_string() {
        let json = serde_json::to_string(&SnapshotId::new(3)).unwrap();
        assert_eq!(json, "\"snapshot-3\"");
    }

    #[test]
    fn info_drops_structure() {
        let snap = Snapshot::new(
            SnapshotId::new(1),
            "first",
            Utc::now(),
            leaf(),
            SnapshotMetadata::default(),
        );
        assert_eq!(snap.element_count, 1);
        let info = snap.info();
        assert_eq!(info.id, snap.id);
        assert_eq!(info.label, "first");
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("structure").is_none());
    }

    #[test]
    fn metadata_defaults_when_missing() {
        let meta: SnapshotMetadata = serde_json::from_str("{\"title\":\"T\"}").unwrap();
        assert_eq!(meta.title.as_deref(), Some("T"));
        assert!(meta.url.is_none());
        assert!(meta.extra.is_empty());
    }
}
