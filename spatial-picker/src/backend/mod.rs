use crate::{BackendError, LatLng, MountPoint, RawShape};

pub mod in_memory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapOptions {
    pub center: LatLng,
    pub zoom: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawControls {
    pub editable: CollectionHandle,
}

/// Invoked by the backend with its native representation of a shape.
pub type ShapeCallback = Box<dyn FnMut(RawShape) + Send>;

/// Capabilities the element needs from an external map widget.
///
/// Tile loading, projection and the drawing toolbar are owned by the
/// implementation. The element only constructs, configures and destroys a map
/// and listens for finished shapes.
pub trait MapBackend {
    fn create_map(
        &mut self,
        mount: &MountPoint,
        options: &MapOptions,
    ) -> Result<MapHandle, BackendError>;

    fn add_tile_source(
        &mut self,
        map: MapHandle,
        url_template: &str,
        attribution: &str,
    ) -> Result<(), BackendError>;

    fn create_editable_shape_collection(&mut self) -> CollectionHandle;

    fn attach_draw_controls(
        &mut self,
        map: MapHandle,
        controls: DrawControls,
    ) -> Result<(), BackendError>;

    fn on_shape_created(
        &mut self,
        map: MapHandle,
        callback: ShapeCallback,
    ) -> Result<SubscriptionId, BackendError>;

    fn on_shape_deleted(
        &mut self,
        map: MapHandle,
        callback: ShapeCallback,
    ) -> Result<SubscriptionId, BackendError>;

    fn unsubscribe(&mut self, map: MapHandle, subscription: SubscriptionId);

    fn destroy_map(&mut self, map: MapHandle);

    /// Paint the map into `rect` and handle pointer input.
    /// Backends which render outside of egui keep the default.
    fn ui(&mut self, _map: MapHandle, _ui: &mut egui::Ui, _rect: egui::Rect) {}
}

impl<T: MapBackend + ?Sized> MapBackend for Box<T> {
    fn create_map(
        &mut self,
        mount: &MountPoint,
        options: &MapOptions,
    ) -> Result<MapHandle, BackendError> {
        (**self).create_map(mount, options)
    }

    fn add_tile_source(
        &mut self,
        map: MapHandle,
        url_template: &str,
        attribution: &str,
    ) -> Result<(), BackendError> {
        (**self).add_tile_source(map, url_template, attribution)
    }

    fn create_editable_shape_collection(&mut self) -> CollectionHandle {
        (**self).create_editable_shape_collection()
    }

    fn attach_draw_controls(
        &mut self,
        map: MapHandle,
        controls: DrawControls,
    ) -> Result<(), BackendError> {
        (**self).attach_draw_controls(map, controls)
    }

    fn on_shape_created(
        &mut self,
        map: MapHandle,
        callback: ShapeCallback,
    ) -> Result<SubscriptionId, BackendError> {
        (**self).on_shape_created(map, callback)
    }

    fn on_shape_deleted(
        &mut self,
        map: MapHandle,
        callback: ShapeCallback,
    ) -> Result<SubscriptionId, BackendError> {
        (**self).on_shape_deleted(map, callback)
    }

    fn unsubscribe(&mut self, map: MapHandle, subscription: SubscriptionId) {
        (**self).unsubscribe(map, subscription)
    }

    fn destroy_map(&mut self, map: MapHandle) {
        (**self).destroy_map(map)
    }

    fn ui(&mut self, map: MapHandle, ui: &mut egui::Ui, rect: egui::Rect) {
        (**self).ui(map, ui, rect)
    }
}
