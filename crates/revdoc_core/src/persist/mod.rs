//! Persistence collaborators for `DocumentStore`.
//!
//! # Responsibility
//! - Define the load/save contract the store calls at process boundaries.
//! - Provide SQLite-backed and no-op implementations.
//!
//! # Invariants
//! - `load` returns every document ever saved, tombstones included.
//! - `save` replaces the persisted set as a whole; partial saves never
//!   become visible.
//! - Implementations reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::document::{Document, DocumentId};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite;

pub use sqlite::SqlitePersistence;

/// Full store content keyed by document id.
pub type DocumentMap = HashMap<DocumentId, Document>;

pub type PersistResult<T> = Result<T, PersistError>;

/// Failure reported by a persistence collaborator.
#[derive(Debug)]
pub enum PersistError {
    Db(DbError),
    InvalidData(String),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted document data: {message}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for PersistError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Load/save interface reached by the store on open, flush and close.
pub trait DocumentPersistence: Send + Sync {
    fn load(&self) -> PersistResult<DocumentMap>;
    fn save(&self, documents: &DocumentMap) -> PersistResult<()>;
}

/// Persistence that keeps nothing; used by purely in-memory stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPersistence;

impl DocumentPersistence for NoopPersistence {
    fn load(&self) -> PersistResult<DocumentMap> {
        Ok(DocumentMap::new())
    }

    fn save(&self, _documents: &DocumentMap) -> PersistResult<()> {
        Ok(())
    }
}
