//! AnnotationFlow - the click → preview → confirm/cancel → persist machine.

use std::fmt;
use std::sync::Arc;

use crate::record::{Coord, Draft};
use crate::sync::{SyncAdapter, SyncError};

/// Where the flow currently is.
///
/// `Persisting` is entered exactly once per confirm, so a second create
/// for the same draft cannot be issued; only `Idle` accepts a new
/// click/confirm cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Previewing,
    Persisting,
}

/// Error type for confirm attempts.
#[derive(Debug)]
pub enum FlowError {
    /// `confirm` was called with no draft open.
    NoDraft,
    /// The required name was empty; the draft stays open.
    EmptyName,
    /// The backend rejected the create; the draft is discarded.
    Backend(SyncError),
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::NoDraft => write!(f, "no draft to confirm"),
            FlowError::EmptyName => write!(f, "a name is required"),
            FlowError::Backend(err) => write!(f, "could not save the record: {}", err),
        }
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlowError::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// Turns a raw map click into a confirmed, persisted record or a
/// discarded draft.
///
/// The flow never reads or writes the record store; every persistence
/// effect goes through the adapter handed in at construction. At most one
/// draft exists at a time, exposed as [`AnnotationFlow::preview`] for the
/// viewport's pending marker.
pub struct AnnotationFlow {
    adapter: Arc<dyn SyncAdapter>,
    state: FlowState,
    draft: Option<Draft>,
}

impl AnnotationFlow {
    pub fn new(adapter: Arc<dyn SyncAdapter>) -> Self {
        AnnotationFlow {
            adapter,
            state: FlowState::Idle,
            draft: None,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// The pending-draft coordinate, if a draft is open.
    pub fn preview(&self) -> Option<Coord> {
        self.draft.as_ref().map(|draft| draft.coord())
    }

    /// Handle a map click.
    ///
    /// From `Idle`, opens a fresh draft at the clicked coordinate. From
    /// `Previewing`, restarts the draft at the new coordinate (the click
    /// replaces the pending location rather than being ignored). While a
    /// create is in flight the click is dropped.
    pub fn map_click(&mut self, coord: Coord) {
        match self.state {
            FlowState::Idle | FlowState::Previewing => {
                self.draft = Some(Draft::at(coord));
                self.state = FlowState::Previewing;
            }
            FlowState::Persisting => {}
        }
    }

    /// Discard the open draft without any backend call.
    ///
    /// Valid only from `Previewing`; a no-op otherwise.
    pub fn cancel(&mut self) {
        if self.state == FlowState::Previewing {
            self.draft = None;
            self.state = FlowState::Idle;
        }
    }

    /// Confirm the open draft and persist it.
    ///
    /// An empty (or whitespace-only) name blocks the transition: the flow
    /// stays in `Previewing` with the draft intact and the backend is
    /// never called. Otherwise the create is issued exactly once; on
    /// success or failure alike the draft is discarded and the flow
    /// returns to `Idle` — a failed save is re-initiated by clicking
    /// again, never retried with the same draft.
    pub fn confirm(&mut self, name: &str, has_toilet_paper: bool) -> Result<String, FlowError> {
        if self.state != FlowState::Previewing {
            return Err(FlowError::NoDraft);
        }
        if name.trim().is_empty() {
            return Err(FlowError::EmptyName);
        }

        let mut draft = self.draft.take().ok_or(FlowError::NoDraft)?;
        draft.name = name.trim().to_string();
        draft.has_toilet_paper = has_toilet_paper;

        self.state = FlowState::Persisting;
        let outcome = self.adapter.create(&draft);
        self.state = FlowState::Idle;

        outcome.map_err(FlowError::Backend)
    }
}
