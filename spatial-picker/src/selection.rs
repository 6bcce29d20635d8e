use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{GeometryError, LatLng};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    Point,
    Rectangle,
    Polygon,
    Circle,
}

impl std::fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SelectionKind::Point => "point",
            SelectionKind::Rectangle => "rectangle",
            SelectionKind::Polygon => "polygon",
            SelectionKind::Circle => "circle",
        })
    }
}

/// The region a user drew on the map.
///
/// Rings are stored open: the closing coordinate equals the first one and is
/// not repeated. Rectangles always use the order south-west, north-west,
/// north-east, south-east.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedMapSelection", into = "UncheckedMapSelection")]
pub struct MapSelection {
    kind: SelectionKind,
    coordinates: Vec<LatLng>,
    radius: Option<f64>,
}

impl MapSelection {
    pub fn point(at: LatLng) -> Self {
        Self {
            kind: SelectionKind::Point,
            coordinates: vec![at],
            radius: None,
        }
    }

    /// `radius` is in metres.
    pub fn circle(center: LatLng, radius: f64) -> Result<Self, GeometryError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GeometryError::InvalidRadius(radius));
        }
        Ok(Self {
            kind: SelectionKind::Circle,
            coordinates: vec![center],
            radius: Some(radius),
        })
    }

    /// Rectangle spanned by two opposite corners, given in any order.
    pub fn rectangle(a: LatLng, b: LatLng) -> Result<Self, GeometryError> {
        let (south, north) = min_max(a.lat(), b.lat());
        let (west, east) = min_max(a.lng(), b.lng());
        if south == north || west == east {
            return Err(GeometryError::DegenerateRectangle);
        }
        Ok(Self {
            kind: SelectionKind::Rectangle,
            coordinates: vec![
                LatLng::new(south, west)?,
                LatLng::new(north, west)?,
                LatLng::new(north, east)?,
                LatLng::new(south, east)?,
            ],
            radius: None,
        })
    }

    /// Polygon from its outer ring. Consecutive duplicates and an explicit
    /// closing vertex are dropped.
    pub fn polygon(ring: impl IntoIterator<Item = LatLng>) -> Result<Self, GeometryError> {
        let mut coordinates = ring.into_iter().dedup().collect::<Vec<_>>();
        if coordinates.len() > 1 && coordinates.first() == coordinates.last() {
            coordinates.pop();
        }
        if coordinates.len() < 3 {
            return Err(GeometryError::TooFewPoints {
                kind: SelectionKind::Polygon,
                required: 3,
                actual: coordinates.len(),
            });
        }
        Ok(Self {
            kind: SelectionKind::Polygon,
            coordinates,
            radius: None,
        })
    }

    /// The single coordinate of a point or the center of a circle, the first
    /// ring vertex otherwise. Never empty.
    pub fn first(&self) -> LatLng {
        self.coordinates[0]
    }

    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    pub fn coordinates(&self) -> &[LatLng] {
        &self.coordinates
    }

    pub fn radius(&self) -> Option<f64> {
        self.radius
    }

    /// South-west and north-east corner of the area covered by the selection.
    /// For circles only the center is considered.
    pub fn bounds(&self) -> (LatLng, LatLng) {
        let (south, north) = self
            .coordinates
            .iter()
            .map(LatLng::lat)
            .minmax_by(f64::total_cmp)
            .into_option()
            .unwrap_or_default();
        let (west, east) = self
            .coordinates
            .iter()
            .map(LatLng::lng)
            .minmax_by(f64::total_cmp)
            .into_option()
            .unwrap_or_default();
        (
            LatLng::new_unchecked(south, west),
            LatLng::new_unchecked(north, east),
        )
    }

    pub fn approx_eq(&self, other: &MapSelection, tolerance: f64) -> bool {
        let radius_eq = match (self.radius, other.radius) {
            (Some(a), Some(b)) => (a - b).abs() <= tolerance,
            (None, None) => true,
            _ => false,
        };
        self.kind == other.kind
            && radius_eq
            && self.coordinates.len() == other.coordinates.len()
            && self
                .coordinates
                .iter()
                .zip(&other.coordinates)
                .all(|(a, b)| a.approx_eq(b, tolerance))
    }
}

impl std::fmt::Display for MapSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.coordinates.iter().join(", "))?;
        if let Some(radius) = self.radius {
            write!(f, " r={radius:.1}m")?;
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct UncheckedMapSelection {
    kind: SelectionKind,
    coordinates: Vec<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    radius: Option<f64>,
}

impl TryFrom<UncheckedMapSelection> for MapSelection {
    type Error = GeometryError;

    fn try_from(value: UncheckedMapSelection) -> Result<Self, Self::Error> {
        let UncheckedMapSelection {
            kind,
            coordinates,
            radius,
        } = value;
        if kind != SelectionKind::Circle && radius.is_some() {
            return Err(GeometryError::UnexpectedRadius(kind));
        }
        match kind {
            SelectionKind::Point => Ok(Self::point(single(kind, &coordinates)?)),
            SelectionKind::Circle => Self::circle(
                single(kind, &coordinates)?,
                radius.ok_or(GeometryError::InvalidRadius(0.0))?,
            ),
            SelectionKind::Rectangle => {
                let [south_west, _, north_east, _] =
                    <[LatLng; 4]>::try_from(coordinates.as_slice()).map_err(|_| {
                        GeometryError::CoordinateCount {
                            kind,
                            expected: 4,
                            actual: coordinates.len(),
                        }
                    })?;
                let rectangle = Self::rectangle(south_west, north_east)?;
                if rectangle.coordinates != coordinates {
                    return Err(GeometryError::UnorderedRectangle);
                }
                Ok(rectangle)
            }
            SelectionKind::Polygon => Self::polygon(coordinates),
        }
    }
}

impl From<MapSelection> for UncheckedMapSelection {
    fn from(value: MapSelection) -> Self {
        Self {
            kind: value.kind,
            coordinates: value.coordinates,
            radius: value.radius,
        }
    }
}

fn single(kind: SelectionKind, coordinates: &[LatLng]) -> Result<LatLng, GeometryError> {
    match coordinates {
        [at] => Ok(*at),
        _ => Err(GeometryError::CoordinateCount {
            kind,
            expected: 1,
            actual: coordinates.len(),
        }),
    }
}

fn min_max(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ll(lat: f64, lng: f64) -> LatLng {
        LatLng::new(lat, lng).unwrap()
    }

    #[test]
    fn rectangle_from_corners_in_any_order() {
        let expected = vec![ll(51.0, -0.1), ll(51.1, -0.1), ll(51.1, 0.0), ll(51.0, 0.0)];
        let a = MapSelection::rectangle(ll(51.0, -0.1), ll(51.1, 0.0)).unwrap();
        let b = MapSelection::rectangle(ll(51.1, -0.1), ll(51.0, 0.0)).unwrap();
        assert_eq!(a.coordinates(), expected.as_slice());
        assert_eq!(a, b);
        assert_eq!(a.kind(), SelectionKind::Rectangle);
    }

    #[test]
    fn flat_rectangle_is_rejected() {
        assert_eq!(
            MapSelection::rectangle(ll(51.0, -0.1), ll(51.0, 0.0)),
            Err(GeometryError::DegenerateRectangle)
        );
    }

    #[test]
    fn polygon_drops_closing_vertex() {
        let polygon =
            MapSelection::polygon([ll(0.0, 0.0), ll(1.0, 0.0), ll(1.0, 1.0), ll(0.0, 0.0)])
                .unwrap();
        assert_eq!(polygon.coordinates().len(), 3);
    }

    #[test]
    fn polygon_needs_three_distinct_points() {
        assert_eq!(
            MapSelection::polygon([ll(0.0, 0.0), ll(1.0, 1.0)]),
            Err(GeometryError::TooFewPoints {
                kind: SelectionKind::Polygon,
                required: 3,
                actual: 2
            })
        );
        // Closed ring of two points collapses as well
        assert!(MapSelection::polygon([ll(0.0, 0.0), ll(1.0, 1.0), ll(0.0, 0.0)]).is_err());
    }

    #[test]
    fn circle_needs_positive_radius() {
        assert!(MapSelection::circle(ll(0.0, 0.0), 0.0).is_err());
        assert!(MapSelection::circle(ll(0.0, 0.0), f64::NAN).is_err());
        assert_eq!(
            MapSelection::circle(ll(0.0, 0.0), 12.5).unwrap().radius(),
            Some(12.5)
        );
    }

    #[test]
    fn bounds_of_polygon() {
        let polygon = MapSelection::polygon([ll(1.0, 5.0), ll(-2.0, 3.0), ll(4.0, -1.0)]).unwrap();
        assert_eq!(polygon.bounds(), (ll(-2.0, -1.0), ll(4.0, 5.0)));
    }

    #[test]
    fn serializes_kind_lowercase() {
        let json = serde_json::to_value(MapSelection::point(ll(1.0, 2.0))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "point", "coordinates": [{"lat": 1.0, "lng": 2.0}]})
        );
    }

    #[test]
    fn deserialize_rebuilds_through_constructors() {
        let circle = MapSelection::circle(ll(51.5, -0.09), 300.0).unwrap();
        let json = serde_json::to_string(&circle).unwrap();
        assert_eq!(serde_json::from_str::<MapSelection>(&json).unwrap(), circle);

        let rectangle = MapSelection::rectangle(ll(51.0, -0.1), ll(51.1, 0.0)).unwrap();
        let json = serde_json::to_string(&rectangle).unwrap();
        assert_eq!(serde_json::from_str::<MapSelection>(&json).unwrap(), rectangle);
    }

    #[test]
    fn deserialize_rejects_invalid_selections() {
        let parse = |json: serde_json::Value| serde_json::from_value::<MapSelection>(json);

        assert!(parse(serde_json::json!({
            "kind": "polygon",
            "coordinates": [{"lat": 0.0, "lng": 0.0}, {"lat": 1.0, "lng": 1.0}]
        }))
        .is_err());
        assert!(parse(serde_json::json!({
            "kind": "circle",
            "coordinates": [{"lat": 0.0, "lng": 0.0}]
        }))
        .is_err());
        assert!(parse(serde_json::json!({"kind": "point", "coordinates": []})).is_err());
        assert!(parse(serde_json::json!({
            "kind": "point",
            "coordinates": [{"lat": 0.0, "lng": 0.0}],
            "radius": 5.0
        }))
        .is_err());
        // North-east corner first
        assert!(parse(serde_json::json!({
            "kind": "rectangle",
            "coordinates": [
                {"lat": 51.1, "lng": 0.0}, {"lat": 51.1, "lng": -0.1},
                {"lat": 51.0, "lng": -0.1}, {"lat": 51.0, "lng": 0.0}
            ]
        }))
        .is_err());
        assert!(parse(serde_json::json!({
            "kind": "rectangle",
            "coordinates": [{"lat": 51.0, "lng": -0.1}, {"lat": 51.1, "lng": 0.0}]
        }))
        .is_err());
    }

    #[test]
    fn deserialize_reports_geometry_error() {
        let unchecked = UncheckedMapSelection {
            kind: SelectionKind::Point,
            coordinates: vec![],
            radius: None,
        };
        assert_eq!(
            MapSelection::try_from(unchecked),
            Err(GeometryError::CoordinateCount {
                kind: SelectionKind::Point,
                expected: 1,
                actual: 0
            })
        );
    }
}
