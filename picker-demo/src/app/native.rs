use eframe::egui;
use log::info;

use super::PickerApp;
use crate::config::Config;

const CONFIG_PATH: &str = "config.json";

pub fn run_native() -> Result<(), eframe::Error> {
    env_logger::init();

    let config = Config::load(CONFIG_PATH).map_err(|e| eframe::Error::AppCreation(Box::new(e)))?;
    info!("Picker config: {:?}", config.picker);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("Spatial Picker - {}", config.picker.name))
            .with_inner_size(config.viewport),
        ..Default::default()
    };

    eframe::run_native(
        "Spatial Picker",
        options,
        Box::new(|_cc| Ok(Box::new(PickerApp::new(config.picker)))),
    )
}
