//! MapSession - wires store, adapter, flow and viewport together.

use std::sync::Arc;

use tracing::warn;

use crate::flow::{AnnotationFlow, FlowError, FlowState};
use crate::geo::{GeolocationProbe, PositionSource};
use crate::record::Coord;
use crate::store::{RecordStore, StoreError};
use crate::sync::{SyncAdapter, SyncError};
use crate::viewport::MapViewport;

/// One running map client: the record store bound to a viewport, a
/// backend chosen at construction, and the annotation flow between them.
///
/// The session is the only caller of the viewport; the store is mutated
/// exclusively by the adapter. Lifecycle: [`MapSession::start`] once,
/// interactions, then [`MapSession::shutdown`] to release any live
/// subscription.
pub struct MapSession<V> {
    store: RecordStore,
    adapter: Arc<dyn SyncAdapter>,
    flow: AnnotationFlow,
    viewport: V,
}

impl<V: MapViewport> MapSession<V> {
    pub fn new(store: RecordStore, adapter: Arc<dyn SyncAdapter>, viewport: V) -> Self {
        let flow = AnnotationFlow::new(adapter.clone());
        MapSession {
            store,
            adapter,
            flow,
            viewport,
        }
    }

    /// Bring the backend online and render the initial record set.
    pub fn start(&mut self) -> Result<(), SyncError> {
        self.adapter.start()?;
        self.render()?;
        Ok(())
    }

    /// One-shot device position for centering the viewport.
    ///
    /// Failure is silent: the caller keeps [`DEFAULT_CENTER`] and no
    /// notice is shown. The coordinate is never written to the store.
    ///
    /// [`DEFAULT_CENTER`]: crate::DEFAULT_CENTER
    pub fn locate<S: PositionSource>(&self, source: S) -> Option<Coord> {
        GeolocationProbe::new(source).acquire().ok()
    }

    /// Route a viewport click into the annotation flow.
    pub fn click(&mut self, coord: Coord) {
        self.flow.map_click(coord);
        self.viewport.preview_marker(self.flow.preview());
    }

    /// Discard the pending draft and clear its marker.
    pub fn cancel(&mut self) {
        self.flow.cancel();
        self.viewport.preview_marker(self.flow.preview());
    }

    /// Confirm the pending draft.
    ///
    /// On a validation failure the draft and its marker stay in place; on
    /// every terminal transition the marker is cleared and the record set
    /// re-rendered.
    pub fn confirm(&mut self, name: &str, has_toilet_paper: bool) -> Result<String, FlowError> {
        let outcome = self.flow.confirm(name, has_toilet_paper);
        self.viewport.preview_marker(self.flow.preview());
        if self.flow.state() == FlowState::Idle {
            if let Err(err) = self.render() {
                warn!(error = %err, "re-render after confirm failed");
            }
        }
        outcome
    }

    /// Delete a record by id. Standalone, outside the annotation flow.
    pub fn delete(&mut self, id: &str) -> Result<(), SyncError> {
        self.adapter.delete(id)?;
        self.render()?;
        Ok(())
    }

    /// Hand the store's current contents to the viewport.
    pub fn render(&mut self) -> Result<(), StoreError> {
        let records = self.store.snapshot()?;
        self.viewport.render_list(&records);
        Ok(())
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn flow(&self) -> &AnnotationFlow {
        &self.flow
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    /// Tear down the backend's live subscription, if any.
    pub fn shutdown(self) {
        self.adapter.stop();
    }
}
