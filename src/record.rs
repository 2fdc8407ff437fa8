//! Record, Draft, and Coord - the POI annotation data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair as reported by a map click or the
/// geolocation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lng: f64,
}

impl Coord {
    pub fn new(lat: f64, lng: f64) -> Self {
        Coord { lat, lng }
    }

    /// Round both components to 6 decimal places.
    ///
    /// Draft coordinates are fixed at this precision at click time and
    /// never refined afterwards.
    pub fn rounded(self) -> Self {
        Coord {
            lat: round6(self.lat),
            lng: round6(self.lng),
        }
    }
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// A persisted POI annotation.
///
/// The serialized shape uses camelCase field names (`hasToiletPaper`,
/// `createdAt`) so blobs and documents written by older clients load
/// unchanged. `id` and `created_at` default to empty/none for entries
/// persisted before either existed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Backend-assigned identifier. Stable once assigned, never reused.
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub has_toilet_paper: bool,
    /// Set by whichever side first persists the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record {
    pub fn coord(&self) -> Coord {
        Coord::new(self.lat, self.lng)
    }
}

/// The in-progress form state for a record that has not been persisted.
///
/// A draft has no id and is never placed in the record store; if it is
/// rendered at all it is rendered as the flow's single pending marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub has_toilet_paper: bool,
}

impl Draft {
    /// Open a draft at the clicked coordinate.
    ///
    /// The name starts empty and the paper flag defaults to `true`, the
    /// same defaults the entry form presents.
    pub fn at(coord: Coord) -> Self {
        let coord = coord.rounded();
        Draft {
            name: String::new(),
            lat: coord.lat,
            lng: coord.lng,
            has_toilet_paper: true,
        }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.lat, self.lng)
    }
}
