use std::fmt;
use std::str::FromStr;

use dsnap_types::{NodeHash, SerializedNode};
use serde::{Deserialize, Serialize};

const ATTRIBUTE_PREFIX: &str = "attribute.";

/// The field a [`Change::Modification`] refers to.
///
/// Displays as `textContent` or `attribute.<name>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Property {
    TextContent,
    Attribute(String),
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::TextContent => f.write_str("textContent"),
            Property::Attribute(name) => write!(f, "{ATTRIBUTE_PREFIX}{name}"),
        }
    }
}

/// A string that names neither `textContent` nor an attribute.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown property: {0:?}")]
pub struct PropertyParseError(pub String);

impl FromStr for Property {
    type Err = PropertyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "textContent" {
            return Ok(Property::TextContent);
        }
        match s.strip_prefix(ATTRIBUTE_PREFIX) {
            Some(name) if !name.is_empty() => Ok(Property::Attribute(name.to_string())),
            _ => Err(PropertyParseError(s.to_string())),
        }
    }
}

impl From<Property> for String {
    fn from(p: Property) -> Self {
        p.to_string()
    }
}

impl TryFrom<String> for Property {
    type Error = PropertyParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Change classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Addition,
    Deletion,
    Modification,
    Move,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Addition => "addition",
            ChangeKind::Deletion => "deletion",
            ChangeKind::Modification => "modification",
            ChangeKind::Move => "move",
        };
        f.write_str(s)
    }
}

/// A single difference between two trees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Change {
    /// A node exists only in the after tree.
    Addition {
        path: String,
        node: SerializedNode,
        description: String,
    },
    /// A node exists only in the before tree.
    Deletion {
        path: String,
        node: SerializedNode,
        description: String,
    },
    /// A field of a node present on both sides changed.
    Modification {
        path: String,
        property: Property,
        before: Option<String>,
        after: Option<String>,
        description: String,
    },
    /// An unchanged subtree moved to a different path.
    Move {
        from_path: String,
        to_path: String,
        hash: NodeHash,
        description: String,
    },
}

impl Change {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::Addition { .. } => ChangeKind::Addition,
            Change::Deletion { .. } => ChangeKind::Deletion,
            Change::Modification { .. } => ChangeKind::Modification,
            Change::Move { .. } => ChangeKind::Move,
        }
    }

    /// Key the change list is ordered by: the path, or the source path for
    /// moves.
    pub fn sort_path(&self) -> &str {
        match self {
            Change::Addition { path, .. }
            | Change::Deletion { path, .. }
            | Change::Modification { path, .. } => path,
            Change::Move { from_path, .. } => from_path,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Change::Addition { description, .. }
            | Change::Deletion { description, .. }
            | Change::Modification { description, .. }
            | Change::Move { description, .. } => description,
        }
    }

    /// The property, for modifications.
    pub fn property(&self) -> Option<&Property> {
        match self {
            Change::Modification { property, .. } => Some(property),
            _ => None,
        }
    }
}

/// Number of changes of each kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub additions: usize,
    pub deletions: usize,
    pub modifications: usize,
    pub moves: usize,
    pub total: usize,
}

impl ChangeSummary {
    pub fn from_changes(changes: &[Change]) -> Self {
        let mut summary = Self::default();
        for change in changes {
            match change.kind() {
                ChangeKind::Addition => summary.additions += 1,
                ChangeKind::Deletion => summary.deletions += 1,
                ChangeKind::Modification => summary.modifications += 1,
                ChangeKind::Move => summary.moves += 1,
            }
        }
        summary.total = changes.len();
        summary
    }

    /// Count for one kind.
    pub fn count(&self, kind: ChangeKind) -> usize {
        match kind {
            ChangeKind::Addition => self.additions,
            ChangeKind::Deletion => self.deletions,
            ChangeKind::Modification => self.modifications,
            ChangeKind::Move => self.moves,
        }
    }
}
