//! RecordStore - the canonical in-memory record sequence bound to rendering.

use std::fmt;
use std::sync::{Arc, RwLock};

use crate::record::Record;

/// Error type for record store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    LockPoisoned(&'static str),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::LockPoisoned(operation) => {
                write!(f, "record store lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// The single source of truth for the record sequence consumed by rendering.
///
/// Ordered by insertion. Mutated only through [`RecordStore::replace`],
/// which is invoked by the active sync adapter whenever the backend's view
/// changes — rendering code never writes here. Clone-friendly via Arc:
/// clones share the same sequence.
#[derive(Clone, Default)]
pub struct RecordStore {
    records: Arc<RwLock<Vec<Record>>>,
}

impl RecordStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full sequence with the backend's latest view.
    ///
    /// Duplicate ids collapse with overwrite-by-id semantics: the later
    /// entry's value wins, at the earlier entry's position. An empty id
    /// carries no identity (legacy entries persisted before ids existed),
    /// so such entries are always kept as distinct records. Re-delivering
    /// an unchanged sequence is a no-op for observable contents, so
    /// redundant at-least-once deliveries are harmless.
    pub fn replace(&self, incoming: Vec<Record>) -> Result<(), StoreError> {
        let mut deduped: Vec<Record> = Vec::with_capacity(incoming.len());
        for record in incoming {
            let existing = if record.id.is_empty() {
                None
            } else {
                deduped.iter_mut().find(|existing| existing.id == record.id)
            };
            match existing {
                Some(existing) => *existing = record,
                None => deduped.push(record),
            }
        }

        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::LockPoisoned("replace"))?;
        *records = deduped;
        Ok(())
    }

    /// A copy of the current sequence, in insertion order.
    pub fn snapshot(&self) -> Result<Vec<Record>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::LockPoisoned("snapshot"))?;
        Ok(records.clone())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::LockPoisoned("len"))?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Whether a record with the given id is currently visible.
    pub fn contains(&self, id: &str) -> Result<bool, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::LockPoisoned("contains"))?;
        Ok(records.iter().any(|record| record.id == id))
    }
}
