use futures::{
    channel::mpsc::{self, UnboundedReceiver, UnboundedSender},
    FutureExt, StreamExt,
};
use log::{debug, error, info, warn};

use crate::{
    template::{Node, INPUT_FIELDS_SLOT, MAP_ID},
    BackendError, CollectionHandle, DrawControls, MapBackend, MapHandle, MapOptions,
    MapSelection, MountPoint, PickerConfig, PickerError, RawShape, ShapeCallback, SubscriptionId,
};

/// Lifecycle of one element. `TornDown` ends a mount cycle, a later
/// [`SpatialPickerElement::attach`] starts a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unmounted,
    /// The mount point exists, but no map widget is bound to it.
    Mounted,
    Initializing,
    Ready,
    TornDown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PickerEvent {
    /// `None` when the selection was cleared.
    SelectionChanged(Option<MapSelection>),
    PhaseChanged(Phase),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&PickerEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapeEventKind {
    Created,
    Deleted,
}

struct ShapeEvent {
    map: MapHandle,
    kind: ShapeEventKind,
    shape: RawShape,
}

struct LiveMap {
    handle: MapHandle,
    collection: CollectionHandle,
    subscriptions: [SubscriptionId; 2],
}

/// Embeds a map widget provided by `B` and turns finished drawings into a
/// single active [`MapSelection`].
pub struct SpatialPickerElement<B: MapBackend> {
    config: PickerConfig,
    backend: B,
    phase: Phase,
    mount: Option<MountPoint>,
    map: Option<LiveMap>,
    selection: Option<MapSelection>,
    last_error: Option<PickerError>,
    pending_init: bool,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u64,
    events_tx: UnboundedSender<ShapeEvent>,
    events_rx: UnboundedReceiver<ShapeEvent>,
}

impl<B: MapBackend> SpatialPickerElement<B> {
    pub fn new(config: PickerConfig, backend: B) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded();
        Self {
            config,
            backend,
            phase: Phase::Unmounted,
            mount: None,
            map: None,
            selection: None,
            last_error: None,
            pending_init: false,
            listeners: Vec::new(),
            next_listener_id: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.config.name = name.into();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selection(&self) -> Option<&MapSelection> {
        self.selection.as_ref()
    }

    pub fn map_handle(&self) -> Option<MapHandle> {
        self.map.as_ref().map(|m| m.handle)
    }

    pub fn shape_collection(&self) -> Option<CollectionHandle> {
        self.map.as_ref().map(|m| m.collection)
    }

    pub fn mount(&self) -> Option<&MountPoint> {
        self.mount.as_ref()
    }

    pub fn last_error(&self) -> Option<&PickerError> {
        self.last_error.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub(crate) fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn add_listener(&mut self, listener: impl FnMut(&PickerEvent) + 'static) -> ListenerId {
        self.next_listener_id += 1;
        let id = ListenerId(self.next_listener_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(x, _)| *x != id);
        before != self.listeners.len()
    }

    /// Records the container realized by the latest render pass.
    pub fn attach(&mut self, mount: MountPoint) {
        debug!("Attached mount point '{}' ({:?})", mount.id(), mount.size());
        self.mount = Some(mount);
        if matches!(self.phase, Phase::Unmounted | Phase::TornDown) {
            self.pending_init = true;
            self.set_phase(Phase::Mounted);
        }
    }

    /// Binds a new map widget to the mount point.
    ///
    /// Must run after the mount point became visible, once per mount cycle.
    pub fn on_mount(&mut self) -> Result<(), PickerError> {
        self.pending_init = false;
        match self.phase {
            Phase::Initializing | Phase::Ready => {
                error!("on_mount called while the map is already bound to its mount point");
                return Err(PickerError::DoubleInitialization);
            }
            Phase::Unmounted | Phase::TornDown => {
                return Err(self.fail(BackendError::MissingMountPoint.into()));
            }
            Phase::Mounted => {}
        }
        let Some(mount) = self.mount.clone() else {
            return Err(self.fail(BackendError::MissingMountPoint.into()));
        };
        if let Err(e) = mount.ensure_measurable() {
            return Err(self.fail(e.into()));
        }

        self.set_phase(Phase::Initializing);
        match self.construct(&mount) {
            Ok(live) => {
                info!("Map {:?} bound to mount point '{}'", live.handle, mount.id());
                self.map = Some(live);
                self.last_error = None;
                self.set_phase(Phase::Ready);
                if !mount.is_attached() {
                    info!(
                        "Mount point '{}' was detached during initialization",
                        mount.id()
                    );
                    self.on_unmount();
                }
                Ok(())
            }
            Err(e) => {
                self.set_phase(Phase::Mounted);
                Err(self.fail(e.into()))
            }
        }
    }

    fn construct(&mut self, mount: &MountPoint) -> Result<LiveMap, BackendError> {
        let options = MapOptions {
            center: self.config.initial_center,
            zoom: self.config.initial_zoom,
        };
        let handle = self.backend.create_map(mount, &options)?;
        self.configure(handle).inspect_err(|_| {
            self.backend.destroy_map(handle);
        })
    }

    fn configure(&mut self, handle: MapHandle) -> Result<LiveMap, BackendError> {
        self.backend
            .add_tile_source(handle, &self.config.tile_url, &self.config.attribution)?;
        let collection = self.backend.create_editable_shape_collection();
        self.backend.attach_draw_controls(
            handle,
            DrawControls {
                editable: collection,
            },
        )?;
        let on_created = self.forward(handle, ShapeEventKind::Created);
        let created = self.backend.on_shape_created(handle, on_created)?;
        let on_deleted = self.forward(handle, ShapeEventKind::Deleted);
        let deleted = self.backend.on_shape_deleted(handle, on_deleted)?;
        Ok(LiveMap {
            handle,
            collection,
            subscriptions: [created, deleted],
        })
    }

    fn forward(&self, map: MapHandle, kind: ShapeEventKind) -> ShapeCallback {
        let tx = self.events_tx.clone();
        Box::new(move |shape| {
            if tx.unbounded_send(ShapeEvent { map, kind, shape }).is_err() {
                debug!("Element is gone, dropping {kind:?} from {map:?}");
            }
        })
    }

    /// Releases the map widget and its event bindings. Without a prior
    /// mount this does nothing.
    pub fn on_unmount(&mut self) {
        if matches!(self.phase, Phase::Unmounted | Phase::TornDown) {
            debug!("on_unmount in phase {:?} ignored", self.phase);
            return;
        }
        self.release_map();
        self.mount = None;
        self.pending_init = false;
        if self.selection.take().is_some() {
            self.emit(PickerEvent::SelectionChanged(None));
        }
        self.set_phase(Phase::TornDown);
    }

    fn release_map(&mut self) {
        if let Some(live) = self.map.take() {
            for subscription in live.subscriptions {
                self.backend.unsubscribe(live.handle, subscription);
            }
            self.backend.destroy_map(live.handle);
            info!("Map {:?} released", live.handle);
        }
    }

    /// Replaces the active selection with the normalized `shape`.
    /// Invalid shapes are discarded and the previous selection stays active.
    pub fn on_selection_drawn(&mut self, shape: &RawShape) -> Result<(), PickerError> {
        if self.phase != Phase::Ready {
            return Err(self.fail(PickerError::NotReady(self.phase)));
        }
        let selection = shape
            .normalize()
            .map_err(|e| self.fail(PickerError::InvalidGeometry(e)))?;
        debug!("Selection changed to {selection}");
        self.selection = Some(selection.clone());
        self.last_error = None;
        self.emit(PickerEvent::SelectionChanged(Some(selection)));
        Ok(())
    }

    pub fn on_selection_cleared(&mut self) {
        debug!("Selection cleared");
        self.selection = None;
        self.emit(PickerEvent::SelectionChanged(None));
    }

    /// Dispatches notifications the map widget delivered since the last call.
    /// Returns the number of handled notifications.
    pub fn poll_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(Some(event)) = self.events_rx.next().now_or_never() {
            if self.map_handle() != Some(event.map) {
                debug!("Ignoring {:?} of stale map {:?}", event.kind, event.map);
                continue;
            }
            handled += 1;
            match event.kind {
                ShapeEventKind::Created => {
                    // Errors are logged and kept in `last_error`
                    let _ = self.on_selection_drawn(&event.shape);
                }
                ShapeEventKind::Deleted => {
                    let is_active = match (event.shape.normalize(), &self.selection) {
                        (Ok(deleted), Some(active)) => deleted.approx_eq(active, 1e-9),
                        _ => false,
                    };
                    if is_active {
                        self.on_selection_cleared();
                    } else {
                        debug!(
                            "Deleted {} is not the active selection",
                            event.shape.layer_type()
                        );
                    }
                }
            }
        }
        handled
    }

    /// Pure description of the element for the current state.
    pub fn render(&self) -> Node {
        let mut inputs = vec![
            Node::div("spatial-picker__name", vec![Node::text(&self.config.name)]),
            Node::Slot(INPUT_FIELDS_SLOT),
        ];
        if let Some(selection) = &self.selection {
            inputs.push(Node::div(
                "spatial-picker__selection",
                vec![Node::text(selection.to_string())],
            ));
        }

        let placeholder = match self.phase {
            Phase::Ready => vec![],
            _ => vec![Node::text("Map goes here")],
        };
        let mut children = vec![
            Node::div("spatial-picker__input_fields", inputs),
            Node::div(
                "spatial-picker__map",
                vec![Node::div(
                    "spatial-picker__map__container",
                    vec![Node::div("spatial-picker__map__container__map", placeholder)
                        .with_id(MAP_ID)],
                )],
            ),
        ];
        if let Some(e) = &self.last_error {
            children.push(Node::div(
                "spatial-picker__error",
                vec![Node::text(e.to_string())],
            ));
        }
        Node::div("spatial-picker", children)
    }

    pub(crate) fn take_pending_init(&mut self) -> bool {
        std::mem::take(&mut self.pending_init)
    }

    pub(crate) fn is_init_pending(&self) -> bool {
        self.pending_init
    }

    fn fail(&mut self, error: PickerError) -> PickerError {
        warn!("{error}");
        self.last_error = Some(error.clone());
        error
    }

    fn set_phase(&mut self, phase: Phase) {
        debug!("Phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.emit(PickerEvent::PhaseChanged(phase));
    }

    fn emit(&mut self, event: PickerEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

impl<B: MapBackend> Drop for SpatialPickerElement<B> {
    fn drop(&mut self) {
        self.release_map();
    }
}
