mod backend;
mod config;
mod element;
mod error;
mod geo;
mod mount;
pub mod projection;
mod selection;
mod shape;
pub mod template;
mod widget;

pub use backend::in_memory::{BackendCall, InMemoryBackend};
pub use backend::{
    CollectionHandle, DrawControls, MapBackend, MapHandle, MapOptions, ShapeCallback,
    SubscriptionId,
};
pub use config::*;
pub use element::*;
pub use error::*;
pub use geo::*;
pub use mount::*;
pub use selection::*;
pub use shape::*;
