use serde::{Deserialize, Serialize};

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub long: f64,
}

/// Pickup location of a donation.
///
/// Coordinates are optional: a donation without them is still valid, it just
/// never shows up in proximity lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub long: Option<f64>,
}

impl Location {
    /// Both coordinates, or `None` when either is missing.
    pub fn point(&self) -> Option<GeoPoint> {
        match (self.lat, self.long) {
            (Some(lat), Some(long)) => Some(GeoPoint { lat, long }),
            _ => None,
        }
    }
}

/// Where a receiver wants food delivered. Unlike donations, all fields are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiverLocation {
    pub name: String,
    pub lat: f64,
    pub long: f64,
}

impl ReceiverLocation {
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            long: self.long,
        }
    }
}
