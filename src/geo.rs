//! Geographic primitives: coordinates and great-circle distance.

pub type CoordType = f64;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct Coordinates {
    pub latitude: CoordType,
    pub longitude: CoordType,
}

impl Coordinates {
    const EARTH_RADIUS_METRES: CoordType = 6_371_000.;

    /// Great-circle distance between two points, in metres, via the haversine formula.
    pub fn distance(self, other: Coordinates) -> CoordType {
        let lat_diff = (self.latitude - other.latitude).to_radians();
        let lon_diff = (self.longitude - other.longitude).to_radians();
        let a = (lat_diff / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (lon_diff / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();
        Self::EARTH_RADIUS_METRES * c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        let p = Coordinates { latitude: 55.0, longitude: 37.0 };
        assert_eq!(p.distance(p), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinates { latitude: 55.611087, longitude: 37.20829 };
        let b = Coordinates { latitude: 55.595884, longitude: 37.209755 };
        assert!((a.distance(b) - b.distance(a)).abs() < 1e-6);
    }

    #[test]
    fn known_distance_is_plausible() {
        // Roughly 1.7 km apart, Moscow sample coordinates.
        let a = Coordinates { latitude: 55.611087, longitude: 37.20829 };
        let b = Coordinates { latitude: 55.595884, longitude: 37.209755 };
        let d = a.distance(b);
        assert!(d > 1500.0 && d < 2000.0, "unexpected distance {d}");
    }
}
