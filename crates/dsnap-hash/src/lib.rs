//! Structural hashing for dsnap.
//!
//! Every serialized node carries a hash over its own fields plus the hashes of
//! its children, computed bottom-up. This crate provides the canonical field
//! encoding and the digest it is reduced with.
//!
//! The digest is FNV-1a 64: deterministic, fixed by definition rather than by
//! the standard library's `DefaultHasher`, and not cryptographic. Collisions
//! are tolerated; the hash is a change-detection aid.

pub mod fnv;
pub mod hasher;

pub use fnv::Fnv1aHasher;
pub use hasher::{HashMismatch, NodeFields, StructuralHasher};
