//! Geographic value objects: coordinates, map regions, movement filtering

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters, used for haversine distance
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Minimum movement between published location fixes, in meters
pub const MIN_FIX_DISTANCE_M: f64 = 5.0;

/// Default map center shown before any location fix arrives
pub const DEFAULT_REGION_CENTER: Coordinate = Coordinate {
    latitude: 37.3349,
    longitude: -122.00902,
};

/// Default map span in decimal degrees
pub const DEFAULT_REGION_SPAN: f64 = 0.05;

/// A geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another coordinate, in meters (haversine)
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_M * c
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}, {:.3}", self.latitude, self.longitude)
    }
}

/// A visible map region: a center plus a symmetric span in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub center: Coordinate,
    pub span: f64,
}

impl Region {
    pub fn new(center: Coordinate, span: f64) -> Self {
        Self { center, span }
    }

    /// Move the region's center without changing the zoom level
    pub fn recenter(&mut self, center: Coordinate) {
        self.center = center;
    }
}

impl Default for Region {
    fn default() -> Self {
        Self {
            center: DEFAULT_REGION_CENTER,
            span: DEFAULT_REGION_SPAN,
        }
    }
}

/// Gates location fixes on minimum movement.
///
/// The first fix always passes; later fixes pass only when they are at
/// least `min_distance_m` away from the last accepted one.
#[derive(Debug)]
pub struct DistanceFilter {
    min_distance_m: f64,
    last: Option<Coordinate>,
}

impl DistanceFilter {
    pub fn new(min_distance_m: f64) -> Self {
        Self {
            min_distance_m,
            last: None,
        }
    }

    /// Returns true when the fix should be published, updating the baseline
    pub fn accept(&mut self, fix: Coordinate) -> bool {
        match self.last {
            Some(last) if last.distance_m(&fix) < self.min_distance_m => false,
            _ => {
                self.last = Some(fix);
                true
            }
        }
    }
}

impl Default for DistanceFilter {
    fn default() -> Self {
        Self::new(MIN_FIX_DISTANCE_M)
    }
}
