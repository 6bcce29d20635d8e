use serde::{Deserialize, Serialize};

use crate::GeometryError;

pub const MAX_LATITUDE: f64 = 90.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// Geographic coordinate in degrees.
///
/// Values built through [`LatLng::new`] are always finite and inside the valid
/// latitude/longitude ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedLatLng", into = "UncheckedLatLng")]
pub struct LatLng {
    lat: f64,
    lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeometryError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(GeometryError::NonFinite { lat, lng });
        }
        if !(-MAX_LATITUDE..=MAX_LATITUDE).contains(&lat) {
            return Err(GeometryError::LatitudeOutOfRange(lat));
        }
        if !(-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&lng) {
            return Err(GeometryError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Only for compile time constants which are known to be in range.
    pub(crate) const fn new_unchecked(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    pub fn approx_eq(&self, other: &LatLng, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance && (self.lng - other.lng).abs() <= tolerance
    }
}

impl TryFrom<(f64, f64)> for LatLng {
    type Error = GeometryError;

    fn try_from((lat, lng): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(lat, lng)
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

#[derive(Serialize, Deserialize)]
struct UncheckedLatLng {
    lat: f64,
    lng: f64,
}

impl TryFrom<UncheckedLatLng> for LatLng {
    type Error = GeometryError;

    fn try_from(value: UncheckedLatLng) -> Result<Self, Self::Error> {
        Self::new(value.lat, value.lng)
    }
}

impl From<LatLng> for UncheckedLatLng {
    fn from(value: LatLng) -> Self {
        Self {
            lat: value.lat,
            lng: value.lng,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_range_boundaries() {
        assert!(LatLng::new(90.0, 180.0).is_ok());
        assert!(LatLng::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_and_non_finite() {
        assert_eq!(
            LatLng::new(90.5, 0.0),
            Err(GeometryError::LatitudeOutOfRange(90.5))
        );
        assert_eq!(
            LatLng::new(0.0, -180.1),
            Err(GeometryError::LongitudeOutOfRange(-180.1))
        );
        assert!(matches!(
            LatLng::new(f64::NAN, 0.0),
            Err(GeometryError::NonFinite { .. })
        ));
        assert!(matches!(
            LatLng::new(0.0, f64::INFINITY),
            Err(GeometryError::NonFinite { .. })
        ));
    }

    #[test]
    fn deserialize_validates() {
        let ok: LatLng = serde_json::from_str(r#"{"lat": 51.5, "lng": -0.1}"#).unwrap();
        assert_eq!(ok, LatLng::new(51.5, -0.1).unwrap());
        assert!(serde_json::from_str::<LatLng>(r#"{"lat": 91.0, "lng": 0.0}"#).is_err());
    }
}
