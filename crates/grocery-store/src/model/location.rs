use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Shift by the given deltas, in degrees.
    pub fn offset(self, dlat: f64, dlng: f64) -> Self {
        Self {
            lat: self.lat + dlat,
            lng: self.lng + dlng,
        }
    }
}

/// Six decimals, as shown in the location panel.
impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}°, {:.6}°", self.lat, self.lng)
    }
}
