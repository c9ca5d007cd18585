//! # dsnap-engine
//!
//! High-level API for capturing and comparing document snapshots.
//!
//! [`SnapshotEngine`] ties the subsystems together: it serializes a live
//! tree through a [`DomReader`](dsnap_dom::DomReader), keeps the result in a
//! bounded snapshot store, diffs stored snapshots and renders the result.
//!
//! ```no_run
//! use dsnap_dom::{Document, Markup};
//! use dsnap_engine::SnapshotEngine;
//!
//! let mut engine = SnapshotEngine::new();
//! let mut doc = Document::from_markup(&Markup::element("div").attr("class", "a")).unwrap();
//! let before = engine.create_snapshot(&doc, &doc.root(), Some("before")).unwrap();
//!
//! let root = doc.root();
//! doc.set_attribute(root, "class", "b").unwrap();
//! let after = engine.create_snapshot(&doc, &doc.root(), Some("after")).unwrap();
//!
//! let diff = engine.compare_snapshots(before, after).unwrap();
//! println!("{}", engine.export_diff(&diff, "text").unwrap());
//! ```

pub mod config;
pub mod engine;
pub mod error;

pub use config::EngineConfig;
pub use engine::SnapshotEngine;
pub use error::{EngineError, EngineResult};
