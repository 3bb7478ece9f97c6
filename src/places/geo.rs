use serde::{Deserialize, Serialize};

/// Mean Earth radius (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;
pub const MILES_PER_KM: f64 = 0.621371;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    Miles,
}

impl DistanceUnit {
    pub fn from_km(self, km: f64) -> f64 {
        match self {
            DistanceUnit::Kilometers => km,
            DistanceUnit::Miles => km * MILES_PER_KM,
        }
    }
}

/// Great-circle distance in kilometers.
pub fn haversine_km(a: LatLng, b: LatLng) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARIS: LatLng = LatLng { lat: 48.8566, lng: 2.3522 };
    const LONDON: LatLng = LatLng { lat: 51.5074, lng: -0.1278 };

    #[test]
    fn test_zero_and_symmetric() {
        assert_eq!(haversine_km(PARIS, PARIS), 0.0);
        let ab = haversine_km(PARIS, LONDON);
        let ba = haversine_km(LONDON, PARIS);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_known_distance() {
        let d = haversine_km(PARIS, LONDON);
        assert!((d - 343.5).abs() < 1.5, "d={d}");
        let miles = DistanceUnit::Miles.from_km(d);
        assert!((miles - d * 0.621371).abs() < 1e-12);
    }

    #[test]
    fn test_antipodes() {
        let d = haversine_km(LatLng::new(0.0, 0.0), LatLng::new(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }
}
