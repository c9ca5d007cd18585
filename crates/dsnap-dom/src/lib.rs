//! Live tree reading and serialization for dsnap.
//!
//! The engine never talks to a browser directly. It reads trees through the
//! [`DomReader`] trait, which a host implements over whatever live document it
//! owns. This crate provides that trait, the [`serialize`] walk that turns a
//! live subtree into an immutable hashed [`dsnap_types::SerializedNode`], and
//! an arena-backed [`Document`] that implements the reader for tests and for
//! hosts that load trees from JSON [`Markup`].
//!
//! # Mutation tracking
//!
//! A [`Document`] can record every mutation made through its API into a
//! capped [`MutationLog`]. Tracking is independent of snapshotting.

pub mod document;
pub mod error;
pub mod markup;
pub mod mutation;
pub mod reader;
pub mod serializer;

pub use document::{Document, NodeId};
pub use error::{DomError, DomResult};
pub use markup::{Markup, MarkupFile};
pub use mutation::{MutationFilter, MutationKind, MutationLog, MutationLogConfig, MutationRecord};
pub use reader::{DomReader, NodeView};
pub use serializer::serialize;
