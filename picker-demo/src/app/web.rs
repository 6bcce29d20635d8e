use eframe::wasm_bindgen::JsCast as _;
use web_sys::{Document, HtmlCanvasElement};

use crate::config::Config;

const CANVAS_ID: &str = "spatial_picker";
const LOADING_ID: &str = "loading_text";

#[derive(Debug, thiserror::Error)]
enum StartError {
    #[error("The page has no document")]
    NoDocument,
    #[error("No element with id '{0}'")]
    MissingCanvas(&'static str),
    #[error("Element '{0}' is not a canvas")]
    NotACanvas(&'static str),
    #[error("eframe did not start: {0:?}")]
    Eframe(eframe::wasm_bindgen::JsValue),
}

pub fn run_web() {
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    wasm_bindgen_futures::spawn_local(async {
        let document = web_sys::window().and_then(|w| w.document());
        let result = match &document {
            Some(document) => start(document).await,
            None => Err(StartError::NoDocument),
        };
        let loading = document
            .as_ref()
            .and_then(|d| d.get_element_by_id(LOADING_ID));

        match (result, loading) {
            (Ok(()), Some(loading)) => loading.remove(),
            (Ok(()), None) => {}
            (Err(e), loading) => {
                log::error!("Spatial picker demo failed to start: {e}");
                if let Some(loading) = loading {
                    loading.set_inner_html(&format!("<p>The demo could not start: {e}</p>"));
                }
            }
        }
    });
}

fn canvas(document: &Document) -> Result<HtmlCanvasElement, StartError> {
    document
        .get_element_by_id(CANVAS_ID)
        .ok_or(StartError::MissingCanvas(CANVAS_ID))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| StartError::NotACanvas(CANVAS_ID))
}

async fn start(document: &Document) -> Result<(), StartError> {
    let canvas = canvas(document)?;
    log::info!("Starting picker demo on '{CANVAS_ID}'");
    eframe::WebRunner::new()
        .start(
            canvas,
            eframe::WebOptions::default(),
            Box::new(|_cc| Ok(Box::new(super::PickerApp::new(Config::default().picker)))),
        )
        .await
        .map_err(StartError::Eframe)
}
