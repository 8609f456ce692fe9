use chrono::{TimeZone, Utc};
use revdoc_core::service::walkthrough::{GREETING, HEAT_WAVE_MESSAGE, HEAT_WAVE_TEMPERATURE};
use revdoc_core::{run_walkthrough, DocumentStore, StoreConfig};

#[test]
fn walkthrough_reports_every_revision() {
    let store = DocumentStore::in_memory();
    let now = Utc.with_ymd_and_hms(2015, 3, 1, 12, 0, 0).unwrap();

    let report = run_walkthrough(&store, now).unwrap();

    assert_eq!(report.retrieved.revision, report.created);
    assert_eq!(report.retrieved.properties["message"], "Hello Couchbase Lite");
    assert_eq!(GREETING, "Hello Couchbase Lite");
    assert_eq!(
        report.retrieved.properties["creationDate"],
        "2015-03-01T12:00:00.000Z"
    );

    assert_eq!(report.updated.generation(), 2);
    assert_eq!(report.updated_properties["message"], HEAT_WAVE_MESSAGE);
    assert_eq!(report.updated_properties["temperature"], HEAT_WAVE_TEMPERATURE);
    assert_eq!(
        report.updated_properties["creationDate"],
        "2015-03-01T12:00:00.000Z"
    );

    assert_eq!(report.deleted.generation(), 3);
    assert!(report.deletion_status);

    let tombstone = store.get(report.id).unwrap();
    assert!(tombstone.deleted);
    assert_eq!(tombstone.revision, report.deleted);
}

#[test]
fn walkthrough_persists_tombstone_through_configured_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        directory: Some(dir.path().to_path_buf()),
        ..StoreConfig::default()
    };

    let store = config.open_store().unwrap();
    let report = run_walkthrough(&store, Utc::now()).unwrap();
    store.close().unwrap();
    assert!(dir.path().join("hello.revdoc").exists());

    let reopened = config.open_store().unwrap();
    let tombstone = reopened.get(report.id).unwrap();
    assert!(tombstone.deleted);
    assert_eq!(tombstone.revision, report.deleted);
}

#[test]
fn walkthrough_fails_on_closed_store() {
    let store = DocumentStore::in_memory();
    store.close().unwrap();
    let err = run_walkthrough(&store, Utc::now()).unwrap_err();
    assert_eq!(err.code(), "closed");
}
