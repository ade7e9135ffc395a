#![forbid(unsafe_code)]
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod action;
pub mod api;
pub mod app;
pub mod components;
pub mod controller;
pub mod dom;
pub mod input;
pub mod logger;
pub mod page;
pub mod storage;

/// Element holding an optional JSON `MarketConfig`.
pub const CONFIG_ELEMENT_ID: &str = "landmark-config";

/// Parse the embedded config, falling back to defaults when it is missing
/// or rejected.
#[must_use]
pub fn config_or_default(embedded: Option<&str>) -> landmark_core::MarketConfig {
    let Some(json) = embedded.filter(|json| !json.trim().is_empty()) else {
        return landmark_core::MarketConfig::default();
    };
    landmark_core::MarketConfig::from_json(json).unwrap_or_else(|err| {
        log::error!("ignoring embedded config: {err}");
        landmark_core::MarketConfig::default()
    })
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Info);
    let embedded = dom::window()
        .ok()
        .and_then(|win| win.document())
        .and_then(|doc| doc.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content());
    let config = config_or_default(embedded.as_deref());
    yew::Renderer::<app::App>::with_props(app::Props { config }).render();
}
