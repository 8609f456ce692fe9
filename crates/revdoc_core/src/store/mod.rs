//! Document store contracts and the in-process implementation.
//!
//! # Responsibility
//! - Define the four revision-checked operations callers depend on.
//! - Keep locking and persistence details inside the store boundary.
//!
//! # Invariants
//! - Update and delete require the caller's view of the current revision.
//! - Conflicts are reported, never retried.

mod document_store;
mod error;

pub use document_store::DocumentStore;
pub use error::{StoreError, StoreResult};

use crate::model::document::{Document, DocumentId, Properties};
use crate::model::revision::Revision;
use std::sync::Arc;

/// Call interface shared by store implementations and wrappers.
pub trait DocumentRepository {
    fn create(&self, properties: Properties) -> StoreResult<(DocumentId, Revision)>;
    fn get(&self, id: DocumentId) -> StoreResult<Document>;
    fn update(
        &self,
        id: DocumentId,
        expected: &Revision,
        properties: Properties,
    ) -> StoreResult<Revision>;
    fn delete(&self, id: DocumentId, expected: &Revision) -> StoreResult<Revision>;
}

impl<T: DocumentRepository + ?Sized> DocumentRepository for &T {
    fn create(&self, properties: Properties) -> StoreResult<(DocumentId, Revision)> {
        (**self).create(properties)
    }

    fn get(&self, id: DocumentId) -> StoreResult<Document> {
        (**self).get(id)
    }

    fn update(
        &self,
        id: DocumentId,
        expected: &Revision,
        properties: Properties,
    ) -> StoreResult<Revision> {
        (**self).update(id, expected, properties)
    }

    fn delete(&self, id: DocumentId, expected: &Revision) -> StoreResult<Revision> {
        (**self).delete(id, expected)
    }
}

impl<T: DocumentRepository + ?Sized> DocumentRepository for Arc<T> {
    fn create(&self, properties: Properties) -> StoreResult<(DocumentId, Revision)> {
        (**self).create(properties)
    }

    fn get(&self, id: DocumentId) -> StoreResult<Document> {
        (**self).get(id)
    }

    fn update(
        &self,
        id: DocumentId,
        expected: &Revision,
        properties: Properties,
    ) -> StoreResult<Revision> {
        (**self).update(id, expected, properties)
    }

    fn delete(&self, id: DocumentId, expected: &Revision) -> StoreResult<Revision> {
        (**self).delete(id, expected)
    }
}
