use std::{cell::RefCell, rc::Rc};

use egui::Vec2;
use spatial_picker::{
    template::MAP_ID, BackendCall, BackendError, InMemoryBackend, LatLng, MapSelection,
    MountPoint, Phase, PickerConfig, PickerError, PickerEvent, RawLatLng, RawRings, RawShape,
    SelectionKind, SpatialPickerElement,
};

type Element = SpatialPickerElement<InMemoryBackend>;

fn element() -> (Element, InMemoryBackend, Rc<RefCell<Vec<PickerEvent>>>) {
    let backend = InMemoryBackend::new();
    let mut element = SpatialPickerElement::new(PickerConfig::default(), backend.clone());
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    element.add_listener(move |e| sink.borrow_mut().push(e.clone()));
    (element, backend, events)
}

fn mount() -> MountPoint {
    MountPoint::new(MAP_ID, Vec2::new(800.0, 200.0))
}

fn phases(events: &RefCell<Vec<PickerEvent>>) -> Vec<Phase> {
    events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            PickerEvent::PhaseChanged(p) => Some(*p),
            _ => None,
        })
        .collect()
}

fn selections(events: &RefCell<Vec<PickerEvent>>) -> Vec<Option<MapSelection>> {
    events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            PickerEvent::SelectionChanged(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

fn ready() -> (Element, InMemoryBackend, Rc<RefCell<Vec<PickerEvent>>>) {
    let (mut element, backend, events) = element();
    element.attach(mount());
    element.on_mount().unwrap();
    events.borrow_mut().clear();
    (element, backend, events)
}

#[test]
fn mount_walks_through_initializing_to_ready() {
    let (mut element, _, events) = element();
    assert_eq!(element.phase(), Phase::Unmounted);
    element.attach(mount());
    element.on_mount().unwrap();
    assert_eq!(
        phases(&events),
        vec![Phase::Mounted, Phase::Initializing, Phase::Ready]
    );
}

#[test]
fn second_mount_is_double_initialization_without_side_effects() {
    let (mut element, backend, events) = ready();
    let handle = element.map_handle();
    let calls = backend.calls().len();

    assert_eq!(element.on_mount(), Err(PickerError::DoubleInitialization));
    assert_eq!(element.map_handle(), handle);
    assert_eq!(backend.calls().len(), calls);
    assert!(phases(&events).is_empty());
}

#[test]
fn remount_after_unmount_starts_fresh_cycle() {
    let (mut element, backend, events) = ready();
    let first = element.map_handle().unwrap();
    element.on_unmount();
    element.attach(mount());
    element.on_mount().unwrap();
    let second = element.map_handle().unwrap();

    assert_ne!(first, second);
    assert_eq!(backend.live_maps(), vec![second]);
    assert_eq!(
        phases(&events),
        vec![
            Phase::TornDown,
            Phase::Mounted,
            Phase::Initializing,
            Phase::Ready
        ]
    );
}

#[test]
fn unmount_before_mount_is_noop() {
    let (mut element, backend, events) = element();
    element.on_unmount();
    assert_eq!(element.phase(), Phase::Unmounted);
    assert!(backend.calls().is_empty());
    assert!(events.borrow().is_empty());
    assert!(element.last_error().is_none());
}

#[test]
fn unmount_releases_bindings_and_map() {
    let (mut element, backend, _) = ready();
    let map = element.map_handle().unwrap();
    element.on_unmount();

    let calls = backend.calls();
    let tail = &calls[calls.len() - 3..];
    assert!(matches!(tail[0], BackendCall::Unsubscribe(m, _) if m == map));
    assert!(matches!(tail[1], BackendCall::Unsubscribe(m, _) if m == map));
    assert_eq!(tail[2], BackendCall::DestroyMap(map));
    assert!(backend.live_maps().is_empty());
    assert_eq!(element.phase(), Phase::TornDown);
}

#[test]
fn mount_without_mount_point_fails() {
    let (mut element, backend, _) = element();
    assert_eq!(
        element.on_mount(),
        Err(PickerError::InitializationFailed(
            BackendError::MissingMountPoint
        ))
    );
    assert!(backend.calls().is_empty());
}

#[test]
fn zero_sized_mount_point_fails_and_stays_mounted() {
    let (mut element, backend, _) = element();
    element.attach(MountPoint::new(MAP_ID, Vec2::new(800.0, 0.0)));
    assert!(matches!(
        element.on_mount(),
        Err(PickerError::InitializationFailed(
            BackendError::ZeroSizedMountPoint { .. }
        ))
    ));
    assert_eq!(element.phase(), Phase::Mounted);
    assert!(backend.calls().is_empty());
    assert!(element.render().find_by_class("spatial-picker__error").is_some());
}

#[test]
fn widget_failure_is_reported_and_not_retried() {
    let (mut element, backend, events) = element();
    backend.fail_next_create(BackendError::Widget("boom".into()));
    element.attach(mount());

    assert!(matches!(
        element.on_mount(),
        Err(PickerError::InitializationFailed(BackendError::Widget(_)))
    ));
    assert_eq!(
        phases(&events),
        vec![Phase::Mounted, Phase::Initializing, Phase::Mounted]
    );
    assert!(element.map_handle().is_none());
    assert_eq!(backend.calls().len(), 1);
}

#[test]
fn detach_during_construction_completes_then_tears_down() {
    let (mut element, backend, events) = element();
    backend.detach_during_next_create();
    element.attach(mount());

    assert_eq!(element.on_mount(), Ok(()));
    assert_eq!(
        phases(&events),
        vec![
            Phase::Mounted,
            Phase::Initializing,
            Phase::Ready,
            Phase::TornDown
        ]
    );
    assert!(backend.live_maps().is_empty());
    assert!(backend
        .calls()
        .iter()
        .any(|c| matches!(c, BackendCall::AttachDrawControls { .. })));
}

#[test]
fn rectangle_draw_then_clear() {
    let (mut element, backend, events) = ready();
    let map = element.map_handle().unwrap();
    backend
        .draw(
            map,
            RawShape::Rectangle {
                bounds: [RawLatLng::new(51.0, -0.1), RawLatLng::new(51.1, 0.0)],
            },
        )
        .unwrap();
    assert_eq!(element.poll_events(), 1);

    let expected = MapSelection::rectangle(
        LatLng::new(51.0, -0.1).unwrap(),
        LatLng::new(51.1, 0.0).unwrap(),
    )
    .unwrap();
    assert_eq!(element.selection(), Some(&expected));
    assert_eq!(expected.kind(), SelectionKind::Rectangle);
    assert_eq!(expected.coordinates().len(), 4);

    element.on_selection_cleared();
    assert_eq!(selections(&events), vec![Some(expected), None]);
    assert!(element.selection().is_none());
}

#[test]
fn two_point_polygon_keeps_previous_selection() {
    let (mut element, _, events) = ready();
    let marker = RawShape::Marker {
        latlng: RawLatLng::new(51.5, -0.09),
    };
    element.on_selection_drawn(&marker).unwrap();
    let previous = element.selection().cloned();

    let polygon = RawShape::Polygon {
        latlngs: RawRings::Flat(vec![RawLatLng::new(0.0, 0.0), RawLatLng::new(1.0, 1.0)]),
    };
    assert!(matches!(
        element.on_selection_drawn(&polygon),
        Err(PickerError::InvalidGeometry(_))
    ));
    assert_eq!(element.selection().cloned(), previous);
    assert_eq!(selections(&events).len(), 1);
    assert!(element.last_error().is_some());
}

#[test]
fn deleting_active_shape_clears_selection() {
    let (mut element, backend, events) = ready();
    let map = element.map_handle().unwrap();
    let circle = RawShape::Circle {
        latlng: RawLatLng::new(51.5, -0.09),
        radius: 300.0,
    };
    backend.draw(map, circle).unwrap();
    element.poll_events();
    backend.delete_last(map).unwrap();
    element.poll_events();

    let changes = selections(&events);
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[1], None);
}

#[test]
fn events_of_previous_cycle_are_ignored() {
    let (mut element, backend, _) = ready();
    let old = element.map_handle().unwrap();
    backend
        .draw(
            old,
            RawShape::Marker {
                latlng: RawLatLng::new(1.0, 1.0),
            },
        )
        .unwrap();
    element.on_unmount();
    element.attach(mount());
    element.on_mount().unwrap();

    assert_eq!(element.poll_events(), 0);
    assert!(element.selection().is_none());
}

#[test]
fn drawing_before_ready_is_rejected() {
    let (mut element, _, _) = element();
    let marker = RawShape::Marker {
        latlng: RawLatLng::new(1.0, 1.0),
    };
    assert_eq!(
        element.on_selection_drawn(&marker),
        Err(PickerError::NotReady(Phase::Unmounted))
    );
}

#[test]
fn render_reflects_state() {
    let (mut element, _, _) = element();
    assert_eq!(
        element.render().to_string(),
        concat!(
            r#"<div class="spatial-picker">"#,
            r#"<div class="spatial-picker__input_fields">"#,
            r#"<div class="spatial-picker__name">World</div>"#,
            r#"<slot name="input-fields"></slot>"#,
            r#"</div>"#,
            r#"<div class="spatial-picker__map">"#,
            r#"<div class="spatial-picker__map__container">"#,
            r#"<div id="map" class="spatial-picker__map__container__map">Map goes here</div>"#,
            r#"</div></div></div>"#,
        )
    );

    element.set_name("Test");
    element.attach(mount());
    element.on_mount().unwrap();
    element
        .on_selection_drawn(&RawShape::Marker {
            latlng: RawLatLng::new(1.0, 2.0),
        })
        .unwrap();
    let template = element.render();
    assert_eq!(
        template
            .find_by_class("spatial-picker__name")
            .unwrap()
            .text_content(),
        "Test"
    );
    assert_eq!(template.find_by_id(MAP_ID).unwrap().text_content(), "");
    assert_eq!(
        template
            .find_by_class("spatial-picker__selection")
            .unwrap()
            .text_content(),
        "point: (1.00000, 2.00000)"
    );
}

#[test]
fn selection_payload_survives_host_round_trip() {
    let (mut element, backend, events) = ready();
    let map = element.map_handle().unwrap();
    backend
        .draw(
            map,
            RawShape::Polygon {
                latlngs: RawRings::Flat(vec![
                    RawLatLng::new(0.0, 0.0),
                    RawLatLng::new(1.0, 0.0),
                    RawLatLng::new(1.0, 1.0),
                ]),
            },
        )
        .unwrap();
    element.poll_events();

    let payload = selections(&events).pop().flatten().unwrap();
    let json = serde_json::to_string(&payload).unwrap();
    assert_eq!(serde_json::from_str::<MapSelection>(&json).unwrap(), payload);

    let truncated = json.replacen(r#"{"lat":1.0,"lng":1.0}"#, r#"{"lat":1.0,"lng":0.0}"#, 1);
    assert!(serde_json::from_str::<MapSelection>(&truncated).is_err());
}
