//! Geometry as the drawing collaborator reports it.
//!
//! The layout follows the draw-toolbar convention: every shape is tagged with
//! the tool that produced it (`layerType`) and carries raw, unchecked
//! coordinates. [`RawShape::normalize`] turns it into a [`MapSelection`],
//! [`RawShape::from`] does the inverse when a selection has to be handed back
//! to the collaborator.

use serde::{Deserialize, Serialize};

use crate::{GeometryError, LatLng, MapSelection, SelectionKind};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawLatLng {
    pub lat: f64,
    pub lng: f64,
}

impl RawLatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    fn checked(self) -> Result<LatLng, GeometryError> {
        LatLng::new(self.lat, self.lng)
    }
}

impl From<LatLng> for RawLatLng {
    fn from(value: LatLng) -> Self {
        Self::new(value.lat(), value.lng())
    }
}

/// Polygon vertices are either a flat ring or a list of rings where the first
/// one is the outer boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRings {
    Flat(Vec<RawLatLng>),
    Nested(Vec<Vec<RawLatLng>>),
}

impl RawRings {
    fn outer(&self) -> &[RawLatLng] {
        match self {
            RawRings::Flat(ring) => ring,
            RawRings::Nested(rings) => {
                if rings.len() > 1 {
                    log::debug!("Ignoring {} inner rings of polygon", rings.len() - 1);
                }
                rings.first().map(Vec::as_slice).unwrap_or_default()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layerType", rename_all = "lowercase")]
pub enum RawShape {
    Marker { latlng: RawLatLng },
    Circle { latlng: RawLatLng, radius: f64 },
    Rectangle { bounds: [RawLatLng; 2] },
    Polygon { latlngs: RawRings },
    Polyline { latlngs: Vec<RawLatLng> },
}

impl RawShape {
    pub fn layer_type(&self) -> &'static str {
        match self {
            RawShape::Marker { .. } => "marker",
            RawShape::Circle { .. } => "circle",
            RawShape::Rectangle { .. } => "rectangle",
            RawShape::Polygon { .. } => "polygon",
            RawShape::Polyline { .. } => "polyline",
        }
    }

    pub fn normalize(&self) -> Result<MapSelection, GeometryError> {
        match self {
            RawShape::Marker { latlng } => Ok(MapSelection::point(latlng.checked()?)),
            RawShape::Circle { latlng, radius } => MapSelection::circle(latlng.checked()?, *radius),
            RawShape::Rectangle { bounds: [a, b] } => {
                MapSelection::rectangle(a.checked()?, b.checked()?)
            }
            RawShape::Polygon { latlngs } => MapSelection::polygon(
                latlngs
                    .outer()
                    .iter()
                    .map(|x| x.checked())
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            RawShape::Polyline { .. } => {
                Err(GeometryError::UnsupportedShape(self.layer_type().into()))
            }
        }
    }
}

impl From<&MapSelection> for RawShape {
    fn from(selection: &MapSelection) -> Self {
        let coordinates = selection.coordinates();
        let first = RawLatLng::from(selection.first());
        match selection.kind() {
            SelectionKind::Point => RawShape::Marker { latlng: first },
            SelectionKind::Circle => RawShape::Circle {
                latlng: first,
                radius: selection.radius().unwrap_or_default(),
            },
            SelectionKind::Rectangle => {
                let (south_west, north_east) = selection.bounds();
                RawShape::Rectangle {
                    bounds: [south_west.into(), north_east.into()],
                }
            }
            SelectionKind::Polygon => RawShape::Polygon {
                latlngs: RawRings::Nested(vec![coordinates
                    .iter()
                    .copied()
                    .map(RawLatLng::from)
                    .chain(Some(first))
                    .collect()]),
            },
        }
    }
}
