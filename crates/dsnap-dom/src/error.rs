/// Errors from reading or building live trees.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomError {
    /// The handle does not refer to a node the reader can access.
    #[error("invalid node handle: {0}")]
    InvalidHandle(String),

    /// An operation that needs an element was given another node kind.
    #[error("expected an element, found {found}")]
    NotAnElement { found: &'static str },

    /// A text operation was given another node kind.
    #[error("expected a text node, found {found}")]
    NotAText { found: &'static str },

    /// The requested tree edit would make a node its own ancestor.
    #[error("cannot insert node {child} under its own descendant {parent}")]
    HierarchyCycle { parent: String, child: String },

    /// The node is not a child of the given parent.
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: String, child: String },

    /// JSON markup could not be parsed.
    #[error("markup error: {0}")]
    Markup(String),
}

/// Convenience alias for DOM results.
pub type DomResult<T> = Result<T, DomError>;
