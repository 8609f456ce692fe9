use crate::model::document::{DocumentId, PropertiesError};
use crate::model::revision::Revision;
use crate::persist::PersistError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by document store operations.
///
/// Every variant leaves the store usable; failed writes change nothing.
#[derive(Debug)]
pub enum StoreError {
    /// No document with this id was ever created.
    NotFound(DocumentId),
    /// Caller presented a revision other than the current one.
    Conflict {
        id: DocumentId,
        expected: Revision,
        current: Revision,
    },
    /// Write attempted on a tombstoned document.
    AlreadyDeleted(DocumentId),
    /// Properties cannot be stored as document content.
    InvalidInput(PropertiesError),
    /// Store was closed; no further operations are served.
    Closed,
    /// Persistence collaborator failed on open, flush or close.
    Persistence(PersistError),
}

impl StoreError {
    /// Stable short code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::AlreadyDeleted(_) => "already_deleted",
            Self::InvalidInput(_) => "invalid_input",
            Self::Closed => "closed",
            Self::Persistence(_) => "persistence",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "document not found: {id}"),
            Self::Conflict {
                id,
                expected,
                current,
            } => write!(
                f,
                "revision conflict on document {id}: expected {expected}, current {current}"
            ),
            Self::AlreadyDeleted(id) => write!(f, "document already deleted: {id}"),
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::Closed => write!(f, "document store is closed"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::NotFound(_) | Self::Conflict { .. } | Self::AlreadyDeleted(_) | Self::Closed => {
                None
            }
        }
    }
}

impl From<PropertiesError> for StoreError {
    fn from(value: PropertiesError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<PersistError> for StoreError {
    fn from(value: PersistError) -> Self {
        Self::Persistence(value)
    }
}
