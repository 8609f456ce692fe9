//! Document domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by the store and its callers.
//!
//! # Invariants
//! - Every document is identified by a stable `DocumentId`.
//! - Deletion is represented by soft-delete tombstones, not hard delete.

pub mod document;
pub mod revision;
