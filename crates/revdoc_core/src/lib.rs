//! Revision-tracked document store.
//! This crate is the single source of truth for document invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod persist;
pub mod service;
pub mod store;

pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::document::{
    properties_from, validate_properties, Document, DocumentId, Properties, PropertiesError,
};
pub use model::revision::{Revision, RevisionParseError};
pub use persist::{DocumentMap, DocumentPersistence, NoopPersistence, PersistError, SqlitePersistence};
pub use service::document_service::DocumentService;
pub use service::walkthrough::{run_walkthrough, WalkthroughReport};
pub use store::{DocumentRepository, DocumentStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
