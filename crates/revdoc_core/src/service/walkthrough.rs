//! Hello-world CRUD walkthrough.
//!
//! # Responsibility
//! - Run the create -> retrieve -> update -> delete sequence against one
//!   store and report every revision it observed.
//! - Log each step the way an interactive demo would print it.
//!
//! # Invariants
//! - Each write uses the revision returned by the preceding read.
//! - A failing step stops the sequence and returns its error.

use crate::model::document::{Document, DocumentId, Properties};
use crate::model::revision::Revision;
use crate::service::document_service::DocumentService;
use crate::store::{DocumentRepository, StoreResult};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use serde_json::Value;

pub const GREETING: &str = "Hello Couchbase Lite";
pub const HEAT_WAVE_MESSAGE: &str = "We're having a heat wave!";
pub const HEAT_WAVE_TEMPERATURE: &str = "95";

const CREATION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Revisions and states observed while running the walkthrough.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkthroughReport {
    pub id: DocumentId,
    pub created: Revision,
    pub retrieved: Document,
    pub updated: Revision,
    pub updated_properties: Properties,
    pub deleted: Revision,
    pub deletion_status: bool,
}

/// Formats `now` the way the greeting document stores `creationDate`.
pub fn format_creation_date(now: DateTime<Utc>) -> String {
    now.format(CREATION_DATE_FORMAT).to_string()
}

/// Runs the full walkthrough against `repo`.
pub fn run_walkthrough<R: DocumentRepository>(
    repo: R,
    now: DateTime<Utc>,
) -> StoreResult<WalkthroughReport> {
    let service = DocumentService::new(repo);
    let result = run_steps(&service, now);
    if let Err(err) = &result {
        error!(
            "event=walkthrough module=service status=error error_code={} error={}",
            err.code(),
            err
        );
    }
    result
}

fn run_steps<R: DocumentRepository>(
    service: &DocumentService<R>,
    now: DateTime<Utc>,
) -> StoreResult<WalkthroughReport> {
    let mut content = Properties::new();
    content.insert("message".to_string(), Value::from(GREETING));
    content.insert(
        "creationDate".to_string(),
        Value::from(format_creation_date(now)),
    );
    debug!("docContent={}", Value::Object(content.clone()));

    let (id, created) = service.create(content)?;
    info!(
        "event=walkthrough_create module=service status=ok doc_id={} rev={}",
        id, created
    );

    let retrieved = retrieve(service, id)?;

    let updated = service.modify(id, |properties| {
        properties.insert("message".to_string(), Value::from(HEAT_WAVE_MESSAGE));
        properties.insert(
            "temperature".to_string(),
            Value::from(HEAT_WAVE_TEMPERATURE),
        );
    })?;
    let after_update = retrieve(service, id)?;
    debug!("updated retrievedDocument={}", after_update.to_json());

    let before_delete = retrieve(service, id)?;
    let deleted = service.delete(id, &before_delete.revision)?;
    let after_delete = service.get(id)?;
    info!(
        "event=walkthrough_delete module=service status=ok doc_id={} rev={} deleted={}",
        id, deleted, after_delete.deleted
    );

    Ok(WalkthroughReport {
        id,
        created,
        retrieved,
        updated,
        updated_properties: after_update.properties,
        deleted,
        deletion_status: after_delete.deleted,
    })
}

fn retrieve<R: DocumentRepository>(
    service: &DocumentService<R>,
    id: DocumentId,
) -> StoreResult<Document> {
    let document = service.get(id)?;
    debug!("retrievedDocument={}", document.to_json());
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::format_creation_date;
    use chrono::{TimeZone, Utc};

    #[test]
    fn creation_date_uses_millisecond_utc_format() {
        let now = Utc.with_ymd_and_hms(2015, 7, 4, 9, 5, 3).unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(format_creation_date(now), "2015-07-04T09:05:03.042Z");
    }
}
