use crate::{Phase, SelectionKind};

/// A shape delivered by the drawing collaborator failed basic validity checks.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("Coordinate ({lat}, {lng}) is not finite")]
    NonFinite { lat: f64, lng: f64 },
    #[error("Latitude {0} is outside of [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is outside of [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("A {kind} needs at least {required} distinct points, got {actual}")]
    TooFewPoints {
        kind: SelectionKind,
        required: usize,
        actual: usize,
    },
    #[error("A {kind} has exactly {expected} coordinates, got {actual}")]
    CoordinateCount {
        kind: SelectionKind,
        expected: usize,
        actual: usize,
    },
    #[error("Rectangle has no extent")]
    DegenerateRectangle,
    #[error("Rectangle corners are not in south-west, north-west, north-east, south-east order")]
    UnorderedRectangle,
    #[error("Circle radius {0} must be finite and positive")]
    InvalidRadius(f64),
    #[error("Only circles carry a radius, got one on a {0}")]
    UnexpectedRadius(SelectionKind),
    #[error("Shape type '{0}' is not supported")]
    UnsupportedShape(String),
}

/// Failure reported by a [`crate::MapBackend`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("No mount point was rendered yet")]
    MissingMountPoint,
    #[error("Mount point '{0}' is not attached to the document")]
    Detached(String),
    #[error("Mount point '{id}' has no layout size ({width}x{height})")]
    ZeroSizedMountPoint { id: String, width: f32, height: f32 },
    #[error("Unknown map handle {0}")]
    UnknownMap(u64),
    #[error("Map widget failed: {0}")]
    Widget(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PickerError {
    #[error("Map is already initialized for this mount")]
    DoubleInitialization,
    #[error("Map initialization failed: {0}")]
    InitializationFailed(#[from] BackendError),
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),
    #[error("Element is not ready to accept selections (phase: {0:?})")]
    NotReady(Phase),
}
