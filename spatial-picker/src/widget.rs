use egui::{Align2, FontId, Frame, Margin, Response, Sense, Stroke, StrokeKind, Ui};

use crate::{
    template::{Node, INPUT_FIELDS_SLOT, MAP_ID},
    MapBackend, MountPoint, SpatialPickerElement,
};

const ROOT_CLASS: &str = "spatial-picker";
const ERROR_CLASS: &str = "spatial-picker__error";

impl<B: MapBackend> SpatialPickerElement<B> {
    pub fn ui(&mut self, ui: &mut Ui) -> Response {
        self.ui_with_inputs(ui, |_| {})
    }

    /// Shows the element. `add_inputs` fills the host defined input fields.
    ///
    /// The map is bound on the frame after its region was first laid out, so
    /// the widget always measures a visible container.
    pub fn ui_with_inputs(
        &mut self,
        ui: &mut Ui,
        mut add_inputs: impl FnMut(&mut Ui),
    ) -> Response {
        if self.take_pending_init() {
            // Failures are kept in `last_error` and shown by the template
            let _ = self.on_mount();
        }
        self.poll_events();

        let template = self.render();
        let response = ui
            .scope(|ui| self.show_node(ui, &template, &mut add_inputs))
            .response;

        if self.is_init_pending() {
            ui.ctx().request_repaint();
        }
        response
    }

    fn show_node(&mut self, ui: &mut Ui, node: &Node, add_inputs: &mut dyn FnMut(&mut Ui)) {
        match node {
            Node::Element { id: Some(id), .. } if *id == MAP_ID => self.map_region_ui(ui, node),
            Node::Element { class, .. } if *class == ERROR_CLASS => {
                ui.colored_label(ui.visuals().error_fg_color, node.text_content());
            }
            Node::Element {
                class, children, ..
            } if *class == ROOT_CLASS => {
                Frame::group(ui.style())
                    .inner_margin(Margin::same(16))
                    .show(ui, |ui| {
                        for child in children {
                            self.show_node(ui, child, add_inputs);
                        }
                    });
            }
            Node::Element { children, .. } => {
                ui.vertical(|ui| {
                    for child in children {
                        self.show_node(ui, child, add_inputs);
                    }
                });
            }
            Node::Text(text) => {
                ui.label(text);
            }
            Node::Slot(name) if *name == INPUT_FIELDS_SLOT => add_inputs(ui),
            Node::Slot(_) => {}
        }
    }

    fn map_region_ui(&mut self, ui: &mut Ui, node: &Node) {
        let size = egui::vec2(ui.available_width(), self.config().map_height);
        let (rect, _) = ui.allocate_exact_size(size, Sense::hover());

        let needs_mount = match self.mount() {
            Some(mount) => mount.size() != rect.size() || !mount.is_attached(),
            None => true,
        };
        if needs_mount {
            self.attach(MountPoint::new(MAP_ID, rect.size()));
        }

        match self.map_handle() {
            Some(map) => self.backend_mut().ui(map, ui, rect),
            None => {
                let painter = ui.painter();
                painter.rect_stroke(
                    rect,
                    0.0,
                    Stroke::new(1.0, ui.visuals().weak_text_color()),
                    StrokeKind::Inside,
                );
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    node.text_content(),
                    FontId::proportional(14.0),
                    ui.visuals().weak_text_color(),
                );
            }
        }
    }
}
