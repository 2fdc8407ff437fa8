//! RemoteLive - multi-writer backend with push-based change delivery.

use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{SyncAdapter, SyncError};
use crate::record::{Draft, Record};
use crate::store::RecordStore;

/// Callback receiving the collection's full sequence after every change.
pub type ChangeListener = Box<dyn Fn(Vec<Record>) + Send + Sync>;

/// A live listener registration. Unsubscribes explicitly via
/// [`Subscription::unsubscribe`] or implicitly on drop, so a shut-down
/// client never leaks a listener in the backend.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Subscription {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

/// The remote store boundary: one named collection of documents whose
/// fields map 1:1 to [`Record`], with the document's own identifier as
/// the id.
///
/// `subscribe` must invoke the listener once immediately with the current
/// full sequence and again after every create/delete by any writer.
/// Delivery is at-least-once; consumers tolerate redundant snapshots.
pub trait DocumentCollection: Send + Sync {
    /// Store a new document. The backend assigns id and creation time.
    fn create(&self, draft: &Draft) -> Result<String, SyncError>;

    /// Remove a document. `Ok(false)` means it did not exist.
    fn delete(&self, id: &str) -> Result<bool, SyncError>;

    /// Register a push listener for the whole collection.
    fn subscribe(&self, listener: ChangeListener) -> Result<Subscription, SyncError>;
}

struct Listeners {
    next_id: u64,
    entries: Vec<(u64, ChangeListener)>,
}

/// In-process multi-writer document collection.
///
/// Clones share documents and listeners, so each clone acts as an
/// independent writer whose mutations are pushed to every subscriber.
/// Listeners run synchronously in registration order and snapshots are
/// delivered in mutation order.
#[derive(Clone)]
pub struct InMemoryCollection {
    documents: Arc<RwLock<Vec<Record>>>,
    listeners: Arc<Mutex<Listeners>>,
}

impl Default for InMemoryCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCollection {
    pub fn new() -> Self {
        InMemoryCollection {
            documents: Arc::new(RwLock::new(Vec::new())),
            listeners: Arc::new(Mutex::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.documents.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-deliver the current snapshot to every listener.
    ///
    /// Real backends redeliver on reconnects and watch resets; tests use
    /// this to exercise the at-least-once contract.
    pub fn rebroadcast(&self) -> Result<(), SyncError> {
        let snapshot = self.snapshot()?;
        self.notify_all(snapshot)
    }

    fn snapshot(&self) -> Result<Vec<Record>, SyncError> {
        let documents = self
            .documents
            .read()
            .map_err(|_| SyncError::Storage("collection lock poisoned".into()))?;
        Ok(documents.clone())
    }

    fn notify_all(&self, snapshot: Vec<Record>) -> Result<(), SyncError> {
        let listeners = self
            .listeners
            .lock()
            .map_err(|_| SyncError::Storage("listener lock poisoned".into()))?;
        for (_, listener) in listeners.entries.iter() {
            listener(snapshot.clone());
        }
        Ok(())
    }
}

impl DocumentCollection for InMemoryCollection {
    fn create(&self, draft: &Draft) -> Result<String, SyncError> {
        let record = Record {
            id: Uuid::new_v4().to_string(),
            name: draft.name.clone(),
            lat: draft.lat,
            lng: draft.lng,
            has_toilet_paper: draft.has_toilet_paper,
            created_at: Some(Utc::now()),
        };
        let id = record.id.clone();

        let snapshot = {
            let mut documents = self
                .documents
                .write()
                .map_err(|_| SyncError::Storage("collection lock poisoned".into()))?;
            documents.push(record);
            documents.clone()
        };

        self.notify_all(snapshot)?;
        Ok(id)
    }

    fn delete(&self, id: &str) -> Result<bool, SyncError> {
        let snapshot = {
            let mut documents = self
                .documents
                .write()
                .map_err(|_| SyncError::Storage("collection lock poisoned".into()))?;
            let before = documents.len();
            documents.retain(|record| record.id != id);
            if documents.len() == before {
                return Ok(false);
            }
            documents.clone()
        };

        self.notify_all(snapshot)?;
        Ok(true)
    }

    fn subscribe(&self, listener: ChangeListener) -> Result<Subscription, SyncError> {
        // Deliver the initial snapshot before registering, outside the
        // listener lock, so a listener that mutates the collection from
        // its first delivery cannot deadlock against notify_all.
        let snapshot = self.snapshot()?;
        listener(snapshot);

        let id = {
            let mut listeners = self
                .listeners
                .lock()
                .map_err(|_| SyncError::Storage("listener lock poisoned".into()))?;
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, listener));
            id
        };

        let registry = Arc::clone(&self.listeners);
        Ok(Subscription::new(move || {
            if let Ok(mut listeners) = registry.lock() {
                listeners.entries.retain(|(entry_id, _)| *entry_id != id);
            }
        }))
    }
}

/// Backend that defers all visibility to the push channel.
///
/// `create` and `delete` never mutate the record store; the collection's
/// own change notification is the sole path by which records appear or
/// disappear, so the store can never diverge from the backend-assigned
/// ids and timestamps. If the subscription reports a new record before
/// `create` returns, the store already reflects it and the resolution
/// changes nothing.
pub struct RemoteLive<C> {
    collection: C,
    store: RecordStore,
    subscription: Mutex<Option<Subscription>>,
}

impl<C: DocumentCollection> RemoteLive<C> {
    pub fn new(collection: C, store: RecordStore) -> Self {
        RemoteLive {
            collection,
            store,
            subscription: Mutex::new(None),
        }
    }
}

impl<C: DocumentCollection> SyncAdapter for RemoteLive<C> {
    fn start(&self) -> Result<(), SyncError> {
        let store = self.store.clone();
        let subscription = self.collection.subscribe(Box::new(move |records| {
            debug!(count = records.len(), "applying pushed snapshot");
            if let Err(err) = store.replace(records) {
                warn!(error = %err, "dropping pushed snapshot");
            }
        }))?;

        let mut slot = self
            .subscription
            .lock()
            .map_err(|_| SyncError::Storage("subscription lock poisoned".into()))?;
        *slot = Some(subscription);
        Ok(())
    }

    fn stop(&self) {
        if let Ok(mut slot) = self.subscription.lock() {
            if let Some(subscription) = slot.take() {
                subscription.unsubscribe();
            }
        }
    }

    fn create(&self, draft: &Draft) -> Result<String, SyncError> {
        self.collection.create(draft)
    }

    fn delete(&self, id: &str) -> Result<(), SyncError> {
        // A concurrent writer may have removed the record already; the
        // intent (record gone) is satisfied either way.
        self.collection.delete(id)?;
        Ok(())
    }
}
