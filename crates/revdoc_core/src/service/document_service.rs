//! Document use-case service.
//!
//! # Responsibility
//! - Provide CRUD entry points plus read-modify-write helpers.
//! - Delegate every write to repository revision checks.
//!
//! # Invariants
//! - Helpers read once and write once; a conflict is returned to the
//!   caller, who re-reads and resubmits.
//! - Service layer stays storage-agnostic.

use crate::model::document::{properties_from, Document, DocumentId, Properties};
use crate::model::revision::Revision;
use crate::store::{DocumentRepository, StoreError, StoreResult};
use serde::Serialize;

/// Use-case service wrapper over a document repository.
pub struct DocumentService<R: DocumentRepository> {
    repo: R,
}

impl<R: DocumentRepository> DocumentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the wrapped repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn create(&self, properties: Properties) -> StoreResult<(DocumentId, Revision)> {
        self.repo.create(properties)
    }

    /// Creates a document from any value that serializes to a JSON object.
    pub fn create_from<T: Serialize>(&self, value: &T) -> StoreResult<(DocumentId, Revision)> {
        let properties = properties_from(value)?;
        self.repo.create(properties)
    }

    pub fn get(&self, id: DocumentId) -> StoreResult<Document> {
        self.repo.get(id)
    }

    /// Gets a document only while it is not tombstoned.
    pub fn get_active(&self, id: DocumentId) -> StoreResult<Option<Document>> {
        let document = self.repo.get(id)?;
        Ok(document.is_active().then_some(document))
    }

    pub fn update(
        &self,
        id: DocumentId,
        expected: &Revision,
        properties: Properties,
    ) -> StoreResult<Revision> {
        self.repo.update(id, expected, properties)
    }

    pub fn delete(&self, id: DocumentId, expected: &Revision) -> StoreResult<Revision> {
        self.repo.delete(id, expected)
    }

    /// Copies the current properties, lets `edit` change the copy, and
    /// writes it back against the revision that was read.
    ///
    /// # Errors
    /// - `AlreadyDeleted` when the read finds a tombstone.
    /// - `Conflict` when another writer got in between; not retried.
    pub fn modify(
        &self,
        id: DocumentId,
        edit: impl FnOnce(&mut Properties),
    ) -> StoreResult<Revision> {
        let current = self.repo.get(id)?;
        if current.deleted {
            return Err(StoreError::AlreadyDeleted(id));
        }
        let mut properties = current.properties;
        edit(&mut properties);
        self.repo.update(id, &current.revision, properties)
    }

    /// Deletes whatever revision is current at read time.
    ///
    /// # Errors
    /// - `AlreadyDeleted` when the document is already tombstoned.
    /// - `Conflict` when another writer got in between; not retried.
    pub fn delete_current(&self, id: DocumentId) -> StoreResult<Revision> {
        let current = self.repo.get(id)?;
        self.repo.delete(id, &current.revision)
    }
}
