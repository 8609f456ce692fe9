//! SQLite implementation of `DocumentPersistence`.
//!
//! # Responsibility
//! - Store the full document set in the `documents` table.
//! - Validate every row on load.
//!
//! # Invariants
//! - `save` runs as one transaction: delete-all followed by re-insert.
//! - `properties` is stored as JSON object text.

use super::{DocumentMap, DocumentPersistence, PersistError, PersistResult};
use crate::db::{open_db, open_db_in_memory};
use crate::model::document::{validate_properties, Document, Properties};
use crate::model::revision::Revision;
use log::info;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

const DOCUMENT_SELECT_SQL: &str = "SELECT id, revision, properties, is_deleted FROM documents";

/// SQLite-backed persistence over one database connection.
pub struct SqlitePersistence {
    conn: Mutex<Connection>,
}

impl SqlitePersistence {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> PersistResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already bootstrapped connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentPersistence for SqlitePersistence {
    fn load(&self) -> PersistResult<DocumentMap> {
        let conn = self.conn();
        let mut stmt = conn.prepare(DOCUMENT_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut documents = DocumentMap::new();

        while let Some(row) = rows.next()? {
            let document = parse_document_row(row)?;
            documents.insert(document.id, document);
        }

        info!(
            "event=persist_load module=persist status=ok backend=sqlite documents={}",
            documents.len()
        );
        Ok(documents)
    }

    fn save(&self, documents: &DocumentMap) -> PersistResult<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM documents;", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO documents (id, revision, properties, is_deleted)
                 VALUES (?1, ?2, ?3, ?4);",
            )?;
            for document in documents.values() {
                let properties = serde_json::to_string(&document.properties).map_err(|err| {
                    PersistError::InvalidData(format!(
                        "cannot encode properties of document {}: {err}",
                        document.id
                    ))
                })?;
                insert.execute(params![
                    document.id.to_string(),
                    document.revision.to_string(),
                    properties,
                    bool_to_int(document.deleted),
                ])?;
            }
        }
        tx.commit()?;

        info!(
            "event=persist_save module=persist status=ok backend=sqlite documents={}",
            documents.len()
        );
        Ok(())
    }
}

fn parse_document_row(row: &Row<'_>) -> PersistResult<Document> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        PersistError::InvalidData(format!("invalid uuid value `{id_text}` in documents.id"))
    })?;
    if id.is_nil() {
        return Err(PersistError::InvalidData(
            "nil uuid in documents.id".to_string(),
        ));
    }

    let revision_text: String = row.get("revision")?;
    let revision = revision_text.parse::<Revision>().map_err(|err| {
        PersistError::InvalidData(format!("{err} in documents.revision for {id}"))
    })?;

    let properties_text: String = row.get("properties")?;
    let properties = serde_json::from_str::<Properties>(&properties_text).map_err(|err| {
        PersistError::InvalidData(format!(
            "invalid JSON object in documents.properties for {id}: {err}"
        ))
    })?;
    validate_properties(&properties).map_err(|err| {
        PersistError::InvalidData(format!("{err} in documents.properties for {id}"))
    })?;

    let deleted = match row.get::<_, i64>("is_deleted")? {
        0 => false,
        1 => true,
        other => {
            return Err(PersistError::InvalidData(format!(
                "invalid is_deleted value `{other}` in documents.is_deleted"
            )));
        }
    };

    Ok(Document {
        id,
        revision,
        properties,
        deleted,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
