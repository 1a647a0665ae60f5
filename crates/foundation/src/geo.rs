use serde::{Deserialize, Serialize};

/// Coordinates closer than this (in degrees, per axis) are the same point.
///
/// 1e-9 degrees is well below a millimetre on the ground.
pub const SAME_POINT_EPSILON_DEG: f64 = 1.0e-9;

/// WGS84 latitude/longitude in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.lat.abs() <= 90.0 && self.lon.abs() <= 180.0
    }

    pub fn same_point(&self, other: &LatLon) -> bool {
        (self.lat - other.lat).abs() <= SAME_POINT_EPSILON_DEG
            && (self.lon - other.lon).abs() <= SAME_POINT_EPSILON_DEG
    }
}

impl std::fmt::Display for LatLon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

impl From<(f64, f64)> for LatLon {
    fn from((lat, lon): (f64, f64)) -> Self {
        LatLon::new(lat, lon)
    }
}
