//! Sync adapters - reconciliation between the record store and a backend.
//!
//! Two backends share one contract: [`LocalPersisted`] keeps the whole
//! sequence in a single durable blob slot and resynchronizes it on every
//! mutation, while [`RemoteLive`] writes to a multi-writer document
//! collection and learns about every change (its own included) through a
//! push subscription. The backend is chosen once at construction; nothing
//! outside this module branches on which one is active.

mod local;
mod remote;

use std::fmt;

use crate::record::Draft;
use crate::store::StoreError;

/// Error type for backend write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The backend rejected or failed a create/delete.
    Write { operation: &'static str, reason: String },
    /// Serializing the sequence for persistence failed.
    Serialize(String),
    /// The in-memory store could not be read or updated.
    Storage(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Write { operation, reason } => {
                write!(f, "backend {} failed: {}", operation, reason)
            }
            SyncError::Serialize(msg) => write!(f, "serialization failed: {}", msg),
            SyncError::Storage(msg) => write!(f, "record store error: {}", msg),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        SyncError::Storage(err.to_string())
    }
}

/// The backend contract the annotation flow writes through.
///
/// Implementations own every mutation of the record store: the flow and
/// the session never touch it directly. Failed writes leave the store
/// untouched and surface as [`SyncError`]; there is no automatic retry.
pub trait SyncAdapter: Send + Sync {
    /// Bring the store up to date and, for live backends, begin receiving
    /// pushed changes. Called once at startup.
    fn start(&self) -> Result<(), SyncError>;

    /// Tear down any live subscription. Called once at shutdown; a no-op
    /// for backends without a push channel.
    fn stop(&self);

    /// Persist a confirmed draft. Returns the backend-assigned id.
    fn create(&self, draft: &Draft) -> Result<String, SyncError>;

    /// Remove a record by id, for every client.
    fn delete(&self, id: &str) -> Result<(), SyncError>;
}

pub use local::{Blob, FileBlob, LocalPersisted, MemoryBlob};
pub use remote::{ChangeListener, DocumentCollection, InMemoryCollection, RemoteLive, Subscription};
