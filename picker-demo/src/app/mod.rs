use std::{cell::RefCell, rc::Rc};

use spatial_picker::{InMemoryBackend, PickerConfig, PickerEvent, SpatialPickerElement};

#[cfg(not(target_arch = "wasm32"))]
mod native;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use native::run_native;
#[cfg(target_arch = "wasm32")]
pub use web::run_web;

const ICON_CLEAR: &str = "\u{1F5D1}";
const ICON_REMOUNT: &str = "\u{21BB}";

pub(crate) struct PickerApp {
    element: SpatialPickerElement<InMemoryBackend>,
    name_input: String,
    // Latest `selection-changed` payload as seen by a host
    published: Rc<RefCell<Option<String>>>,
}

impl PickerApp {
    pub fn new(config: PickerConfig) -> Self {
        let name_input = config.name.clone();
        let mut element = SpatialPickerElement::new(config, InMemoryBackend::new());
        let published = Rc::new(RefCell::new(None));
        let sink = published.clone();
        element.add_listener(move |event| {
            if let PickerEvent::SelectionChanged(selection) = event {
                let json = match selection {
                    Some(s) => serde_json::to_string_pretty(s),
                    None => Ok("null".to_string()),
                };
                match json {
                    Ok(json) => *sink.borrow_mut() = Some(json),
                    Err(e) => log::error!("Cannot serialize selection: {e}"),
                }
            }
        });
        Self {
            element,
            name_input,
            published,
        }
    }
}

impl eframe::App for PickerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Spatial picker");
            ui.label("Click to place a marker, drag to span a rectangle, right click deletes the latest shape.");

            let name_input = &mut self.name_input;
            self.element.ui_with_inputs(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Name:");
                    ui.text_edit_singleline(name_input);
                });
            });
            if self.name_input != self.element.name() {
                self.element.set_name(self.name_input.clone());
            }

            ui.horizontal(|ui| {
                if ui
                    .button(ICON_CLEAR)
                    .on_hover_text("Clear selection")
                    .clicked()
                {
                    self.element.on_selection_cleared();
                }
                if ui
                    .button(ICON_REMOUNT)
                    .on_hover_text("Unmount and mount the map again")
                    .clicked()
                {
                    self.element.on_unmount();
                }
                ui.label(format!("Phase: {:?}", self.element.phase()));
            });

            if let Some(json) = self.published.borrow().as_deref() {
                ui.separator();
                ui.label("selection-changed:");
                ui.code(json);
            }
        });
    }
}
