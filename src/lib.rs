//! Annotation lifecycle and sync engine for a shared POI map.
//!
//! The crate implements the part of a "toilet, has-paper-or-not" map that
//! has real invariants to protect: the click → preview → confirm/cancel →
//! persist state machine ([`AnnotationFlow`]) and the reconciliation
//! between the in-memory record list ([`RecordStore`]) and a backend that
//! may push changes at any time, including mid-interaction.
//!
//! Two backends share the [`SyncAdapter`] contract: [`LocalPersisted`]
//! (one durable blob slot, whole-list resync on every mutation) and
//! [`RemoteLive`] (multi-writer document collection whose push channel is
//! the sole visibility path for writes). [`MapSession`] wires a chosen
//! backend to a [`MapViewport`] implementation owned by the UI layer.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use toiletmap::{Coord, LocalPersisted, MapSession, MemoryBlob, RecordStore};
//!
//! let store = RecordStore::new();
//! let adapter = Arc::new(LocalPersisted::new(MemoryBlob::new(), store.clone()));
//! let mut session = MapSession::new(store, adapter, viewport);
//!
//! session.start()?;
//! session.click(Coord::new(10.31, 123.90));
//! let id = session.confirm("Cafe X", true)?;
//! ```

mod flow;
mod geo;
mod record;
mod session;
mod store;
mod sync;
mod viewport;

pub use flow::{AnnotationFlow, FlowError, FlowState};
pub use geo::{GeoError, GeolocationProbe, PositionSource};
pub use record::{Coord, Draft, Record};
pub use session::MapSession;
pub use store::{RecordStore, StoreError};
pub use sync::{
    Blob, ChangeListener, DocumentCollection, FileBlob, InMemoryCollection, LocalPersisted,
    MemoryBlob, RemoteLive, Subscription, SyncAdapter, SyncError,
};
pub use viewport::{MapViewport, DEFAULT_CENTER};
