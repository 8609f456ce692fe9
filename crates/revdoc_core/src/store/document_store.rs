//! In-process document store with revision-checked writes.
//!
//! # Responsibility
//! - Own the id -> document mapping and serve create/get/update/delete.
//! - Reach the persistence collaborator on open, flush and close only.
//!
//! # Invariants
//! - Writes hold the entry's shard lock across check-and-set, so colliding
//!   writers against one id serialize and exactly one observes success.
//! - Checks run in a fixed order: closed, input, existence, tombstone,
//!   revision. A failed call mutates nothing.
//! - Nothing is retried internally.

use super::error::{StoreError, StoreResult};
use super::DocumentRepository;
use crate::model::document::{validate_properties, Document, DocumentId, Properties};
use crate::model::revision::Revision;
use crate::persist::{DocumentMap, DocumentPersistence, NoopPersistence};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, error, info, warn};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Open,
    Closed,
}

/// Revision-tracked document store.
///
/// Constructed explicitly and passed to callers; safe to share across
/// threads behind `&` or `Arc`.
pub struct DocumentStore {
    documents: DashMap<DocumentId, Document>,
    persistence: Box<dyn DocumentPersistence>,
    lifecycle: RwLock<Lifecycle>,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("documents", &self.documents.len())
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

impl DocumentStore {
    /// Creates an empty store without persistence.
    pub fn in_memory() -> Self {
        Self {
            documents: DashMap::new(),
            persistence: Box::new(NoopPersistence),
            lifecycle: RwLock::new(Lifecycle::Open),
        }
    }

    /// Creates a store seeded from `persistence.load()`.
    ///
    /// # Errors
    /// - `Persistence` when loading fails; no store is returned.
    pub fn open(persistence: impl DocumentPersistence + 'static) -> StoreResult<Self> {
        let started_at = Instant::now();
        let loaded = match persistence.load() {
            Ok(loaded) => loaded,
            Err(err) => {
                error!(
                    "event=store_open module=store status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        let documents = DashMap::with_capacity(loaded.len());
        for (id, document) in loaded {
            documents.insert(id, document);
        }
        info!(
            "event=store_open module=store status=ok documents={} duration_ms={}",
            documents.len(),
            started_at.elapsed().as_millis()
        );

        Ok(Self {
            documents,
            persistence: Box::new(persistence),
            lifecycle: RwLock::new(Lifecycle::Open),
        })
    }

    /// Creates a document and returns its id and first revision.
    pub fn create(&self, properties: Properties) -> StoreResult<(DocumentId, Revision)> {
        let _open = self.ensure_open()?;
        validate_properties(&properties)?;

        let mut document = Document::new(properties);
        loop {
            match self.documents.entry(document.id) {
                Entry::Vacant(slot) => {
                    let id = document.id;
                    let revision = document.revision.clone();
                    slot.insert(document);
                    info!(
                        "event=doc_create module=store status=ok doc_id={} rev={}",
                        id, revision
                    );
                    return Ok((id, revision));
                }
                // Ids are never reused, tombstones included.
                Entry::Occupied(_) => document.id = DocumentId::new_v4(),
            }
        }
    }

    /// Returns the current state of a document, tombstones included.
    pub fn get(&self, id: DocumentId) -> StoreResult<Document> {
        let _open = self.ensure_open()?;
        let document = self
            .documents
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound(id))?;
        debug!(
            "event=doc_get module=store status=ok doc_id={} rev={} deleted={}",
            id, document.revision, document.deleted
        );
        Ok(document)
    }

    /// Replaces a document's properties wholesale.
    pub fn update(
        &self,
        id: DocumentId,
        expected: &Revision,
        properties: Properties,
    ) -> StoreResult<Revision> {
        let _open = self.ensure_open()?;
        validate_properties(&properties)?;

        let result = self.write(id, expected, |document| {
            document.properties = properties;
        });
        log_write("doc_update", id, &result);
        result
    }

    /// Tombstones a document, freezing its last properties.
    pub fn delete(&self, id: DocumentId, expected: &Revision) -> StoreResult<Revision> {
        let _open = self.ensure_open()?;

        let result = self.write(id, expected, |document| {
            document.deleted = true;
        });
        log_write("doc_delete", id, &result);
        result
    }

    /// Snapshot of documents ordered by id.
    pub fn list(&self, include_deleted: bool) -> StoreResult<Vec<Document>> {
        let _open = self.ensure_open()?;
        let mut documents: Vec<Document> = self
            .documents
            .iter()
            .filter(|entry| include_deleted || entry.is_active())
            .map(|entry| entry.value().clone())
            .collect();
        documents.sort_by_key(|document| document.id);
        Ok(documents)
    }

    /// Number of ids ever created, tombstones included.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        *self.lifecycle.read().unwrap_or_else(PoisonError::into_inner) == Lifecycle::Closed
    }

    /// Saves the current content through the persistence collaborator.
    pub fn flush(&self) -> StoreResult<()> {
        let _open = self.ensure_open()?;
        self.save("store_flush")
    }

    /// Saves and closes the store.
    ///
    /// Closing twice is a no-op. When saving fails the store stays open so
    /// the caller can retry.
    pub fn close(&self) -> StoreResult<()> {
        let mut lifecycle = self
            .lifecycle
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if *lifecycle == Lifecycle::Closed {
            return Ok(());
        }
        self.save("store_close")?;
        *lifecycle = Lifecycle::Closed;
        Ok(())
    }

    fn ensure_open(&self) -> StoreResult<RwLockReadGuard<'_, Lifecycle>> {
        let lifecycle = self.lifecycle.read().unwrap_or_else(PoisonError::into_inner);
        if *lifecycle == Lifecycle::Closed {
            return Err(StoreError::Closed);
        }
        Ok(lifecycle)
    }

    fn write(
        &self,
        id: DocumentId,
        expected: &Revision,
        apply: impl FnOnce(&mut Document),
    ) -> StoreResult<Revision> {
        let mut entry = self.documents.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        let document = entry.value_mut();

        if document.deleted {
            return Err(StoreError::AlreadyDeleted(id));
        }
        if document.revision != *expected {
            return Err(StoreError::Conflict {
                id,
                expected: expected.clone(),
                current: document.revision.clone(),
            });
        }

        apply(document);
        document.revision = document.revision.next();
        Ok(document.revision.clone())
    }

    fn snapshot(&self) -> DocumentMap {
        self.documents
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    fn save(&self, event: &str) -> StoreResult<()> {
        let started_at = Instant::now();
        let snapshot = self.snapshot();
        match self.persistence.save(&snapshot) {
            Ok(()) => {
                info!(
                    "event={} module=store status=ok documents={} duration_ms={}",
                    event,
                    snapshot.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event={} module=store status=error duration_ms={} error={}",
                    event,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl DocumentRepository for DocumentStore {
    fn create(&self, properties: Properties) -> StoreResult<(DocumentId, Revision)> {
        DocumentStore::create(self, properties)
    }

    fn get(&self, id: DocumentId) -> StoreResult<Document> {
        DocumentStore::get(self, id)
    }

    fn update(
        &self,
        id: DocumentId,
        expected: &Revision,
        properties: Properties,
    ) -> StoreResult<Revision> {
        DocumentStore::update(self, id, expected, properties)
    }

    fn delete(&self, id: DocumentId, expected: &Revision) -> StoreResult<Revision> {
        DocumentStore::delete(self, id, expected)
    }
}

fn log_write(event: &str, id: DocumentId, result: &StoreResult<Revision>) {
    match result {
        Ok(revision) => info!(
            "event={} module=store status=ok doc_id={} rev={}",
            event, id, revision
        ),
        Err(err) => warn!(
            "event={} module=store status=rejected doc_id={} error_code={}",
            event,
            id,
            err.code()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::DocumentStore;
    use crate::model::revision::Revision;
    use crate::store::StoreError;
    use serde_json::json;

    fn props(value: serde_json::Value) -> crate::Properties {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn failed_update_leaves_document_unchanged() {
        let store = DocumentStore::in_memory();
        let (id, rev) = store.create(props(json!({ "n": 1 }))).unwrap();

        let stale = Revision::first();
        let err = store.update(id, &stale, props(json!({ "n": 2 }))).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        let doc = store.get(id).unwrap();
        assert_eq!(doc.revision, rev);
        assert_eq!(doc.properties["n"], 1);
    }

    #[test]
    fn invalid_input_is_reported_before_lookup() {
        let store = DocumentStore::in_memory();
        let missing = uuid::Uuid::new_v4();
        let err = store
            .update(missing, &Revision::first(), props(json!({ "_id": "x" })))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[test]
    fn close_is_idempotent_and_blocks_operations() {
        let store = DocumentStore::in_memory();
        let (id, _) = store.create(props(json!({}))).unwrap();

        store.close().unwrap();
        store.close().unwrap();
        assert!(store.is_closed());
        assert!(matches!(store.get(id), Err(StoreError::Closed)));
        assert!(matches!(
            store.create(props(json!({}))),
            Err(StoreError::Closed)
        ));
        assert!(matches!(store.flush(), Err(StoreError::Closed)));
    }

    #[test]
    fn list_orders_by_id_and_filters_tombstones() {
        let store = DocumentStore::in_memory();
        let (a, _) = store.create(props(json!({ "k": "a" }))).unwrap();
        let (b, rev_b) = store.create(props(json!({ "k": "b" }))).unwrap();
        store.delete(b, &rev_b).unwrap();

        let active = store.list(false).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, a);

        let all = store.list(true).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].id < all[1].id);
        assert_eq!(store.len(), 2);
    }
}
