//! LocalPersisted - single-process backend over one durable blob slot.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use super::{SyncAdapter, SyncError};
use crate::record::{Draft, Record};
use crate::store::RecordStore;

/// A single named slot holding one serialized string.
///
/// This is the localStorage-shaped boundary: read the whole slot, or
/// overwrite the whole slot. There is no partial-write primitive, which
/// is why [`LocalPersisted`] rewrites the full sequence on every mutation.
pub trait Blob: Send + Sync {
    /// Read the slot. `None` means nothing was ever stored.
    fn read(&self) -> io::Result<Option<String>>;

    /// Overwrite the slot.
    fn write(&self, contents: &str) -> io::Result<()>;
}

/// In-memory blob slot for tests and throwaway sessions.
#[derive(Clone, Default)]
pub struct MemoryBlob {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryBlob {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-load the slot, simulating a previous session's save.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        MemoryBlob {
            contents: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }
}

impl Blob for MemoryBlob {
    fn read(&self) -> io::Result<Option<String>> {
        match self.contents.lock() {
            Ok(contents) => Ok(contents.clone()),
            Err(_) => Err(io::Error::new(io::ErrorKind::Other, "blob lock poisoned")),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        match self.contents.lock() {
            Ok(mut slot) => {
                *slot = Some(contents.to_string());
                Ok(())
            }
            Err(_) => Err(io::Error::new(io::ErrorKind::Other, "blob lock poisoned")),
        }
    }
}

/// Durable blob slot backed by a single file.
pub struct FileBlob {
    path: PathBuf,
}

impl FileBlob {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileBlob { path: path.into() }
    }
}

impl Blob for FileBlob {
    fn read(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        std::fs::write(&self.path, contents)
    }
}

/// Backend that keeps the whole sequence in one blob slot.
///
/// `start` loads the previously stored list into the record store;
/// corrupt or unreadable contents degrade to the empty sequence and are
/// never surfaced. Every mutation assigns ids locally, updates the store
/// and rewrites the full post-mutation sequence (whole-list resync —
/// there is no push channel to rely on).
pub struct LocalPersisted<B> {
    blob: B,
    store: RecordStore,
}

impl<B: Blob> LocalPersisted<B> {
    pub fn new(blob: B, store: RecordStore) -> Self {
        LocalPersisted { blob, store }
    }

    /// Parse the stored sequence. Missing, unreadable or corrupt contents
    /// all yield the empty sequence. Entries persisted by older clients
    /// without an id get a fresh one here, so each stays a distinct,
    /// individually deletable record; the next save persists the ids.
    fn load(&self) -> Vec<Record> {
        let contents = match self.blob.read() {
            Ok(Some(contents)) => contents,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(error = %err, "failed to read persisted records, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Record>>(&contents) {
            Ok(mut records) => {
                for record in records.iter_mut().filter(|record| record.id.is_empty()) {
                    record.id = Uuid::new_v4().to_string();
                }
                records
            }
            Err(err) => {
                warn!(error = %err, "persisted records are corrupt, starting empty");
                Vec::new()
            }
        }
    }

    /// Serialize and store the full sequence, overwriting the slot.
    fn save(&self, records: &[Record], operation: &'static str) -> Result<(), SyncError> {
        let contents =
            serde_json::to_string(records).map_err(|err| SyncError::Serialize(err.to_string()))?;
        self.blob.write(&contents).map_err(|err| SyncError::Write {
            operation,
            reason: err.to_string(),
        })
    }
}

impl<B: Blob> SyncAdapter for LocalPersisted<B> {
    fn start(&self) -> Result<(), SyncError> {
        self.store.replace(self.load())?;
        Ok(())
    }

    fn stop(&self) {}

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

        let mut records = self.store.snapshot()?;
        records.push(record);
        self.save(&records, "create")?;
        self.store.replace(records)?;
        Ok(id)
    }

    fn delete(&self, id: &str) -> Result<(), SyncError> {
        let mut records = self.store.snapshot()?;
        records.retain(|record| record.id != id);
        self.save(&records, "delete")?;
        self.store.replace(records)?;
        Ok(())
    }
}
