//! Store configuration.
//!
//! # Responsibility
//! - Describe which database to open and how to log.
//! - Build a ready-to-use `DocumentStore` from that description.
//!
//! # Invariants
//! - `name` must satisfy the database naming rules before anything opens.
//! - `directory = None` means a purely in-memory store.

use crate::db::{database_path, is_valid_database_name, DbError};
use crate::logging::default_log_level;
use crate::persist::{PersistError, SqlitePersistence};
use crate::store::{DocumentStore, StoreError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DEFAULT_DATABASE_NAME: &str = "hello";

#[derive(Debug)]
pub enum ConfigError {
    InvalidDatabaseName(String),
    Store(StoreError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDatabaseName(name) => write!(f, "bad database name `{name}`"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDatabaseName(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for ConfigError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<PersistError> for ConfigError {
    fn from(value: PersistError) -> Self {
        Self::Store(StoreError::Persistence(value))
    }
}

impl From<DbError> for ConfigError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::InvalidDatabaseName(name) => Self::InvalidDatabaseName(name),
            other => Self::from(PersistError::Db(other)),
        }
    }
}

/// Settings for opening one store and its logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database name; also the file stem under `directory`.
    pub name: String,
    /// Directory holding database files. `None` keeps everything in memory.
    pub directory: Option<PathBuf>,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logs.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DATABASE_NAME.to_string(),
            directory: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_database_name(&self.name) {
            return Err(ConfigError::InvalidDatabaseName(self.name.clone()));
        }
        Ok(())
    }

    /// On-disk database file, or `None` for in-memory stores.
    pub fn database_path(&self) -> Result<Option<PathBuf>, ConfigError> {
        match &self.directory {
            Some(directory) => Ok(Some(database_path(directory, &self.name)?)),
            None => {
                self.validate()?;
                Ok(None)
            }
        }
    }

    /// Opens the configured store.
    pub fn open_store(&self) -> Result<DocumentStore, ConfigError> {
        match self.database_path()? {
            Some(path) => {
                let persistence = SqlitePersistence::open(path)?;
                Ok(DocumentStore::open(persistence)?)
            }
            None => Ok(DocumentStore::in_memory()),
        }
    }
}
