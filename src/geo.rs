//! GeolocationProbe - one-shot acquisition of the device position.

use std::fmt;

use tracing::debug;

use crate::record::Coord;

/// Error type for position acquisition.
///
/// None of these are fatal to the rest of the system; callers keep the
/// default viewport center and carry on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoError {
    /// The user denied the location permission.
    PermissionDenied,
    /// The platform did not produce a position in time.
    Timeout,
    /// No position API is available on this platform.
    Unsupported,
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoError::PermissionDenied => write!(f, "location permission denied"),
            GeoError::Timeout => write!(f, "timed out waiting for a position"),
            GeoError::Unsupported => write!(f, "no position source available"),
        }
    }
}

impl std::error::Error for GeoError {}

/// Platform boundary for the device position.
///
/// Implementations wrap whatever the host exposes (browser geolocation,
/// CoreLocation, a GPS daemon). Closures returning
/// `Result<Coord, GeoError>` implement this directly, which is usually
/// all tests need.
pub trait PositionSource {
    fn current_position(&self) -> Result<Coord, GeoError>;
}

impl<F> PositionSource for F
where
    F: Fn() -> Result<Coord, GeoError>,
{
    fn current_position(&self) -> Result<Coord, GeoError> {
        self()
    }
}

/// One-shot position probe.
///
/// `acquire` consumes the probe: a single attempt with a single
/// resolution, no retry and no polling. The resulting coordinate is for
/// the viewport's current-location indicator only and is never written to
/// the record store.
pub struct GeolocationProbe<S> {
    source: S,
}

impl<S: PositionSource> GeolocationProbe<S> {
    pub fn new(source: S) -> Self {
        GeolocationProbe { source }
    }

    /// Ask the source for the current position, once.
    pub fn acquire(self) -> Result<Coord, GeoError> {
        match self.source.current_position() {
            Ok(coord) => Ok(coord),
            Err(err) => {
                debug!(error = %err, "geolocation unavailable, keeping default center");
                Err(err)
            }
        }
    }
}
