//! MapViewport - the rendering contract the core drives.

use crate::record::{Coord, Record};

/// The viewport center used until a device position is known.
pub const DEFAULT_CENTER: Coord = Coord {
    lat: 10.3157,
    lng: 123.8854,
};

/// What the core needs from a map renderer.
///
/// The viewport owns tiles, icons and popups; the core only hands it the
/// current record sequence and at most one pending-draft marker. Click
/// coordinates travel the other way, into [`MapSession::click`].
///
/// [`MapSession::click`]: crate::MapSession::click
pub trait MapViewport {
    /// Render the given records as markers, replacing the previous set.
    fn render_list(&mut self, records: &[Record]);

    /// Show the pending-draft marker at the given coordinate, or clear it.
    fn preview_marker(&mut self, coord: Option<Coord>);
}
