//! Geographic coordinates for rider locations.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, -90..=90.
    pub latitude: f64,
    /// Longitude in degrees, -180..=180.
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a point, validating coordinate ranges.
    ///
    /// Returns `None` if either coordinate is out of range or not finite.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance to `other` in meters (Haversine formula).
    #[must_use]
    pub fn distance_meters(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_M * c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_ranges() {
        assert!(GeoPoint::new(0.0, 0.0).is_some());
        assert!(GeoPoint::new(90.0, 180.0).is_some());
        assert!(GeoPoint::new(-90.0, -180.0).is_some());
        assert!(GeoPoint::new(90.1, 0.0).is_none());
        assert!(GeoPoint::new(0.0, 180.1).is_none());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_none());
    }

    #[test]
    fn test_distance_zero_for_same_point() {
        let p = GeoPoint::new(40.7128, -74.0060).expect("valid point");
        assert!(p.distance_meters(&p) < 1e-6);
    }

    #[test]
    fn test_distance_known_pair() {
        // Dhaka city center to Gulshan is roughly 7.5 km
        let center = GeoPoint::new(23.7104, 90.4074).expect("valid point");
        let gulshan = GeoPoint::new(23.7806, 90.4193).expect("valid point");
        let d = center.distance_meters(&gulshan);
        assert!((7_000.0..9_000.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_distance_symmetric() {
        let a = GeoPoint::new(51.5007, -0.1246).expect("valid point");
        let b = GeoPoint::new(48.8584, 2.2945).expect("valid point");
        let ab = a.distance_meters(&b);
        let ba = b.distance_meters(&a);
        assert!((ab - ba).abs() < 1e-6);
        // London to Paris is about 340 km
        assert!((330_000.0..350_000.0).contains(&ab), "got {ab}");
    }
}
