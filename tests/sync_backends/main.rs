//! Backend-focused integration tests: blob durability and push delivery.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use toiletmap::{
    DocumentCollection, Draft, FileBlob, InMemoryCollection, LocalPersisted, RecordStore,
    RemoteLive, SyncAdapter,
};

fn draft(name: &str, lat: f64, lng: f64) -> Draft {
    Draft {
        name: name.into(),
        lat,
        lng,
        has_toilet_paper: true,
    }
}

// --- FileBlob durability ---

#[test]
fn file_blob_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("toilets.json");

    let store = RecordStore::new();
    let adapter = LocalPersisted::new(FileBlob::new(&path), store.clone());
    adapter.start().unwrap();
    adapter.create(&draft("Cafe X", 10.31, 123.90)).unwrap();
    adapter
        .create(&draft("Ayala Center Cebu", 10.3173, 123.9058))
        .unwrap();
    let saved = store.snapshot().unwrap();

    let restarted = RecordStore::new();
    let adapter = LocalPersisted::new(FileBlob::new(&path), restarted.clone());
    adapter.start().unwrap();

    assert_eq!(restarted.snapshot().unwrap(), saved);
}

#[test]
fn missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new();
    let adapter = LocalPersisted::new(FileBlob::new(dir.path().join("never-written.json")), store.clone());

    adapter.start().unwrap();
    assert!(store.is_empty().unwrap());
}

#[test]
fn corrupt_file_degrades_to_empty_and_recovers_on_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("toilets.json");
    std::fs::write(&path, "{ definitely not a record list").unwrap();

    let store = RecordStore::new();
    let adapter = LocalPersisted::new(FileBlob::new(&path), store.clone());
    adapter.start().unwrap();
    assert!(store.is_empty().unwrap());

    // The next mutation overwrites the corrupt slot with a valid list.
    adapter.create(&draft("Cafe X", 10.31, 123.90)).unwrap();

    let restarted = RecordStore::new();
    LocalPersisted::new(FileBlob::new(&path), restarted.clone())
        .start()
        .unwrap();
    assert_eq!(restarted.len().unwrap(), 1);
}

// --- Push delivery ---

#[test]
fn deliveries_arrive_in_mutation_order() {
    let collection = InMemoryCollection::new();
    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    let _subscription = collection
        .subscribe(Box::new(move |records| {
            sink.lock().unwrap().push(records.len());
        }))
        .unwrap();

    let first = collection.create(&draft("one", 10.0, 123.0)).unwrap();
    collection.create(&draft("two", 10.1, 123.1)).unwrap();
    collection.delete(&first).unwrap();

    // Initial snapshot, then one delivery per mutation.
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 1]);
}

#[test]
fn delete_of_missing_document_notifies_nobody() {
    let collection = InMemoryCollection::new();
    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    let _subscription = collection
        .subscribe(Box::new(move |records| {
            sink.lock().unwrap().push(records.len());
        }))
        .unwrap();

    assert!(!collection.delete("no-such-id").unwrap());
    assert_eq!(*seen.lock().unwrap(), vec![0]);
}

#[test]
fn redundant_delivery_is_idempotent_for_the_store() {
    let collection = InMemoryCollection::new();
    let store = RecordStore::new();
    let remote = RemoteLive::new(collection.clone(), store.clone());
    remote.start().unwrap();

    remote.create(&draft("Cafe X", 10.31, 123.90)).unwrap();
    let before = store.snapshot().unwrap();

    collection.rebroadcast().unwrap();
    collection.rebroadcast().unwrap();

    assert_eq!(store.snapshot().unwrap(), before);
}

#[test]
fn unsubscribe_then_mutate_delivers_nothing() {
    let collection = InMemoryCollection::new();
    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    let subscription = collection
        .subscribe(Box::new(move |records| {
            sink.lock().unwrap().push(records.len());
        }))
        .unwrap();

    subscription.unsubscribe();
    collection.create(&draft("unseen", 10.0, 123.0)).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![0]);
}

#[test]
fn listener_may_mutate_the_collection_from_its_initial_delivery() {
    let collection = InMemoryCollection::new();
    let writer = collection.clone();
    let seeded = Arc::new(AtomicBool::new(false));

    // A subscriber that seeds the collection when it finds it empty,
    // straight from the initial snapshot delivery.
    let flag = seeded.clone();
    let _subscription = collection
        .subscribe(Box::new(move |records| {
            if records.is_empty() && !flag.swap(true, Ordering::SeqCst) {
                writer.create(&draft("seeded", 10.0, 123.0)).unwrap();
            }
        }))
        .unwrap();

    assert!(seeded.load(Ordering::SeqCst));
    assert_eq!(collection.len(), 1);
}

#[test]
fn remote_writes_never_touch_the_store_directly() {
    let collection = InMemoryCollection::new();
    let store = RecordStore::new();
    let remote = RemoteLive::new(collection.clone(), store.clone());

    // Not started: no subscription, so nothing may reach the store.
    remote.create(&draft("invisible", 10.0, 123.0)).unwrap();
    assert!(store.is_empty().unwrap());
    assert_eq!(collection.len(), 1);
}
