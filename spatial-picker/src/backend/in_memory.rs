use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, StrokeKind};

use super::{
    CollectionHandle, DrawControls, MapBackend, MapHandle, MapOptions, ShapeCallback,
    SubscriptionId,
};
use crate::{projection::Viewport, BackendError, MountPoint, RawLatLng, RawShape};

/// Every call the element made, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateMap {
        mount_id: String,
        options: MapOptions,
    },
    AddTileSource {
        map: MapHandle,
        url_template: String,
        attribution: String,
    },
    CreateCollection(CollectionHandle),
    AttachDrawControls {
        map: MapHandle,
        controls: DrawControls,
    },
    OnShapeCreated(MapHandle),
    OnShapeDeleted(MapHandle),
    Unsubscribe(MapHandle, SubscriptionId),
    DestroyMap(MapHandle),
}

struct LiveMap {
    mount: MountPoint,
    viewport: Viewport,
    attribution: Option<String>,
    controls: Option<DrawControls>,
    created: Vec<(SubscriptionId, ShapeCallback)>,
    deleted: Vec<(SubscriptionId, ShapeCallback)>,
    drag_start: Option<Pos2>,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    calls: Vec<BackendCall>,
    maps: BTreeMap<MapHandle, LiveMap>,
    collections: BTreeMap<CollectionHandle, Vec<RawShape>>,
    fail_next_create: Option<BackendError>,
    detach_on_create: bool,
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn map_mut(&mut self, map: MapHandle) -> Result<&mut LiveMap, BackendError> {
        self.maps
            .get_mut(&map)
            .ok_or(BackendError::UnknownMap(map.0))
    }

    fn draw(&mut self, map: MapHandle, shape: RawShape) -> Result<(), BackendError> {
        let live = self
            .maps
            .get_mut(&map)
            .ok_or(BackendError::UnknownMap(map.0))?;
        let controls = live.controls.ok_or_else(|| {
            BackendError::Widget("No draw controls attached to this map".into())
        })?;
        for (_, callback) in live.created.iter_mut() {
            callback(shape.clone());
        }
        self.collections
            .entry(controls.editable)
            .or_default()
            .push(shape);
        Ok(())
    }

    fn delete_last(&mut self, map: MapHandle) -> Result<Option<RawShape>, BackendError> {
        let live = self
            .maps
            .get_mut(&map)
            .ok_or(BackendError::UnknownMap(map.0))?;
        let Some(controls) = live.controls else {
            return Ok(None);
        };
        let removed = self
            .collections
            .get_mut(&controls.editable)
            .and_then(Vec::pop);
        if let Some(shape) = &removed {
            for (_, callback) in live.deleted.iter_mut() {
                callback(shape.clone());
            }
        }
        Ok(removed)
    }
}

/// Map backend that keeps everything in memory.
///
/// It records every call, lets tests synthesize finished drawings and offers a
/// plain drawing surface when embedded in egui: click places a marker, drag
/// spans a rectangle and a secondary click deletes the latest shape.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    pub fn live_maps(&self) -> Vec<MapHandle> {
        self.lock().maps.keys().copied().collect()
    }

    pub fn shapes(&self, collection: CollectionHandle) -> Vec<RawShape> {
        self.lock()
            .collections
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    /// The next `create_map` fails with `error`.
    pub fn fail_next_create(&self, error: BackendError) {
        self.lock().fail_next_create = Some(error);
    }

    /// The next `create_map` detaches its mount point while constructing,
    /// as if the host removed the container during initialization.
    pub fn detach_during_next_create(&self) {
        self.lock().detach_on_create = true;
    }

    /// Simulates a user finishing a drawing with the draw toolbar.
    pub fn draw(&self, map: MapHandle, shape: RawShape) -> Result<(), BackendError> {
        self.lock().draw(map, shape)
    }

    /// Simulates a user deleting the most recent shape with the draw toolbar.
    pub fn delete_last(&self, map: MapHandle) -> Result<Option<RawShape>, BackendError> {
        self.lock().delete_last(map)
    }
}

impl MapBackend for InMemoryBackend {
    fn create_map(
        &mut self,
        mount: &MountPoint,
        options: &MapOptions,
    ) -> Result<MapHandle, BackendError> {
        let mut inner = self.lock();
        inner.calls.push(BackendCall::CreateMap {
            mount_id: mount.id().to_string(),
            options: *options,
        });
        if let Some(error) = inner.fail_next_create.take() {
            return Err(error);
        }
        mount.ensure_measurable()?;
        if std::mem::take(&mut inner.detach_on_create) {
            mount.detach();
        }

        let handle = MapHandle(inner.next_id());
        inner.maps.insert(
            handle,
            LiveMap {
                mount: mount.clone(),
                viewport: Viewport {
                    center: options.center,
                    zoom: options.zoom,
                },
                attribution: None,
                controls: None,
                created: Vec::new(),
                deleted: Vec::new(),
                drag_start: None,
            },
        );
        Ok(handle)
    }

    fn add_tile_source(
        &mut self,
        map: MapHandle,
        url_template: &str,
        attribution: &str,
    ) -> Result<(), BackendError> {
        let mut inner = self.lock();
        inner.calls.push(BackendCall::AddTileSource {
            map,
            url_template: url_template.to_string(),
            attribution: attribution.to_string(),
        });
        inner.map_mut(map)?.attribution = Some(attribution.to_string());
        Ok(())
    }

    fn create_editable_shape_collection(&mut self) -> CollectionHandle {
        let mut inner = self.lock();
        let handle = CollectionHandle(inner.next_id());
        inner.collections.insert(handle, Vec::new());
        inner.calls.push(BackendCall::CreateCollection(handle));
        handle
    }

    fn attach_draw_controls(
        &mut self,
        map: MapHandle,
        controls: DrawControls,
    ) -> Result<(), BackendError> {
        let mut inner = self.lock();
        inner
            .calls
            .push(BackendCall::AttachDrawControls { map, controls });
        inner.map_mut(map)?.controls = Some(controls);
        Ok(())
    }

    fn on_shape_created(
        &mut self,
        map: MapHandle,
        callback: ShapeCallback,
    ) -> Result<SubscriptionId, BackendError> {
        let mut inner = self.lock();
        inner.calls.push(BackendCall::OnShapeCreated(map));
        let id = SubscriptionId(inner.next_id());
        inner.map_mut(map)?.created.push((id, callback));
        Ok(id)
    }

    fn on_shape_deleted(
        &mut self,
        map: MapHandle,
        callback: ShapeCallback,
    ) -> Result<SubscriptionId, BackendError> {
        let mut inner = self.lock();
        inner.calls.push(BackendCall::OnShapeDeleted(map));
        let id = SubscriptionId(inner.next_id());
        inner.map_mut(map)?.deleted.push((id, callback));
        Ok(id)
    }

    fn unsubscribe(&mut self, map: MapHandle, subscription: SubscriptionId) {
        let mut inner = self.lock();
        inner.calls.push(BackendCall::Unsubscribe(map, subscription));
        if let Ok(live) = inner.map_mut(map) {
            live.created.retain(|(id, _)| *id != subscription);
            live.deleted.retain(|(id, _)| *id != subscription);
        }
    }

    fn destroy_map(&mut self, map: MapHandle) {
        let mut inner = self.lock();
        inner.calls.push(BackendCall::DestroyMap(map));
        if let Some(live) = inner.maps.remove(&map) {
            if let Some(controls) = live.controls {
                inner.collections.remove(&controls.editable);
            }
            log::debug!("Destroyed map {map:?} on mount '{}'", live.mount.id());
        }
    }

    fn ui(&mut self, map: MapHandle, ui: &mut egui::Ui, rect: Rect) {
        let mut inner = self.lock();
        let Ok(live) = inner.map_mut(map) else {
            return;
        };
        let viewport = live.viewport;
        let response = ui.interact(rect, ui.id().with(("map", map.0)), Sense::click_and_drag());
        let painter = ui.painter().with_clip_rect(rect);

        painter.rect_filled(rect, 0.0, Color32::from_rgb(170, 211, 223));
        let grid = Stroke::new(1.0, Color32::from_white_alpha(60));
        let mut x = rect.left();
        while x < rect.right() {
            painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], grid);
            x += 64.0;
        }
        let mut y = rect.top();
        while y < rect.bottom() {
            painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], grid);
            y += 64.0;
        }
        if let Some(attribution) = &live.attribution {
            painter.text(
                rect.right_bottom() - egui::vec2(4.0, 2.0),
                Align2::RIGHT_BOTTOM,
                attribution,
                FontId::proportional(10.0),
                Color32::DARK_GRAY,
            );
        }

        let outline = Stroke::new(2.0, Color32::from_rgb(51, 136, 255));
        if response.drag_started() {
            live.drag_start = response.interact_pointer_pos();
        }
        if response.dragged() {
            if let (Some(start), Some(current)) = (live.drag_start, response.interact_pointer_pos())
            {
                painter.rect_stroke(
                    Rect::from_two_pos(start, current),
                    0.0,
                    Stroke::new(1.0, Color32::BLACK),
                    StrokeKind::Inside,
                );
            }
        }

        let mut finished = None;
        if response.drag_stopped() {
            if let (Some(start), Some(end)) = (live.drag_start.take(), response.interact_pointer_pos())
            {
                finished = dragged_rectangle(viewport, rect, start, end);
            }
        } else if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                finished = Some(RawShape::Marker {
                    latlng: viewport.unproject(pos, rect).into(),
                });
            }
        }
        let delete = response.secondary_clicked();

        let shapes = live
            .controls
            .and_then(|c| inner.collections.get(&c.editable))
            .cloned()
            .unwrap_or_default();
        for shape in &shapes {
            paint_shape(&painter, viewport, rect, shape, outline);
        }

        if let Some(shape) = finished {
            if let Err(e) = inner.draw(map, shape) {
                log::warn!("Drawing failed: {e}");
            }
        }
        if delete {
            if let Err(e) = inner.delete_last(map) {
                log::warn!("Deleting failed: {e}");
            }
        }
    }
}

/// Rectangle spanned by a drag, `None` when it has no extent on the map.
fn dragged_rectangle(viewport: Viewport, rect: Rect, start: Pos2, end: Pos2) -> Option<RawShape> {
    let a = viewport.unproject(start, rect);
    let b = viewport.unproject(end, rect);
    let shape = RawShape::Rectangle {
        bounds: [a.into(), b.into()],
    };
    shape.normalize().is_ok().then_some(shape)
}

fn paint_shape(
    painter: &egui::Painter,
    viewport: Viewport,
    rect: Rect,
    shape: &RawShape,
    stroke: Stroke,
) {
    let project = |p: &RawLatLng| match crate::LatLng::new(p.lat, p.lng) {
        Ok(at) => Some(viewport.project(at, rect)),
        Err(_) => None,
    };
    match shape.normalize() {
        Ok(selection) => {
            let points = selection
                .coordinates()
                .iter()
                .map(|at| viewport.project(*at, rect))
                .collect::<Vec<_>>();
            match (selection.radius(), points.as_slice()) {
                (Some(radius), [center]) => {
                    let at = selection.coordinates()[0];
                    let px = (radius / viewport.metres_per_pixel(at.lat())) as f32;
                    painter.circle_stroke(*center, px, stroke);
                }
                (None, [single]) => {
                    painter.circle_filled(*single, 5.0, stroke.color);
                }
                _ => {
                    painter.add(Shape::closed_line(points, stroke));
                }
            }
        }
        Err(_) => {
            if let RawShape::Polyline { latlngs } = shape {
                let points = latlngs.iter().filter_map(project).collect::<Vec<_>>();
                painter.add(Shape::line(points, stroke));
            }
        }
    }
}
