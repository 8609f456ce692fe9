use revdoc_core::{DocumentService, DocumentStore, Properties, StoreError};
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn concurrent_creates_return_distinct_ids() {
    let store = Arc::new(DocumentStore::in_memory());
    let threads = 8;
    let per_thread = 250;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..per_thread)
                    .map(|n| {
                        let content = json!({ "thread": t, "n": n });
                        store.create(content.as_object().unwrap().clone()).unwrap().0
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id), "duplicate id {id}");
        }
    }
    assert_eq!(ids.len(), threads * per_thread);
    assert_eq!(store.len(), threads * per_thread);
}

#[test]
fn colliding_updates_have_exactly_one_winner() {
    let store = Arc::new(DocumentStore::in_memory());
    let (id, base) = store.create(Properties::new()).unwrap();
    let writers = 16;
    let barrier = Arc::new(Barrier::new(writers));

    let handles: Vec<_> = (0..writers)
        .map(|w| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let base = base.clone();
            thread::spawn(move || {
                let content = json!({ "writer": w });
                barrier.wait();
                store.update(id, &base, content.as_object().unwrap().clone())
            })
        })
        .collect();

    let mut winners = Vec::new();
    let mut conflicts = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(revision) => winners.push(revision),
            Err(StoreError::Conflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(conflicts, writers - 1);
    let current = store.get(id).unwrap();
    assert_eq!(current.revision, winners[0]);
    assert_eq!(current.generation(), 2);
}

#[test]
fn colliding_update_and_delete_have_exactly_one_winner() {
    for _ in 0..50 {
        let store = Arc::new(DocumentStore::in_memory());
        let (id, base) = store.create(Properties::new()).unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let updater = {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let base = base.clone();
            thread::spawn(move || {
                barrier.wait();
                store.update(id, &base, Properties::new())
            })
        };
        let deleter = {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.delete(id, &base)
            })
        };

        let updated = updater.join().unwrap();
        let deleted = deleter.join().unwrap();
        assert!(updated.is_ok() ^ deleted.is_ok());

        let current = store.get(id).unwrap();
        assert_eq!(current.generation(), 2);
        assert_eq!(current.deleted, deleted.is_ok());
    }
}

#[test]
fn read_modify_write_loop_loses_no_updates() {
    let store = Arc::new(DocumentStore::in_memory());
    let (id, _) = store
        .create(json!({ "counter": 0 }).as_object().unwrap().clone())
        .unwrap();
    let threads = 4;
    let increments = 50;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let service = DocumentService::new(store);
                for _ in 0..increments {
                    loop {
                        let result = service.modify(id, |props| {
                            let next = props["counter"].as_u64().unwrap() + 1;
                            props.insert("counter".to_string(), json!(next));
                        });
                        match result {
                            Ok(_) => break,
                            Err(StoreError::Conflict { .. }) => continue,
                            Err(other) => panic!("unexpected error: {other}"),
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let current = store.get(id).unwrap();
    let expected = (threads * increments) as u64;
    assert_eq!(current.properties["counter"], json!(expected));
    assert_eq!(current.generation(), expected + 1);
}
