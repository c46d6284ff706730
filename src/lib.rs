/// GoLinks - browser extension background for go/ short links
/// Built with Rust + WASM

pub mod background;
pub mod backend;
pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod mapping;
pub mod recognizer;
pub mod resolver;
pub mod storage;
pub mod store;
pub mod suggest;

#[cfg(test)]
mod test_support;

use background::Background;
use config::Config;
use host::{ExtensionStorage, ExtensionTabs, from_js, to_js};
use resolver::{NavigationEvent, TabChange, TabSnapshot};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

type ExtensionBackground = Background<ExtensionStorage, ExtensionTabs>;

thread_local! {
    static BACKGROUND: RefCell<Option<Rc<ExtensionBackground>>> = const { RefCell::new(None) };
}

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Build the background context; `config` may be `undefined`
#[wasm_bindgen]
pub fn init_background(config: JsValue) -> Result<(), JsValue> {
    let config: Config = if config.is_undefined() || config.is_null() {
        Config::default()
    } else {
        from_js(config)?
    };

    log::set_max_level(config.level_filter());
    let background = Background::new(config, ExtensionStorage, ExtensionTabs);
    log::info!(
        "GoLinks background ready, mappings under {:?}",
        background.config().storage_key
    );
    BACKGROUND.with(|slot| *slot.borrow_mut() = Some(Rc::new(background)));
    Ok(())
}

fn background() -> Result<Rc<ExtensionBackground>, JsValue> {
    BACKGROUND
        .with(|slot| slot.borrow().clone())
        .ok_or_else(|| JsValue::from_str("init_background has not been called"))
}

/// `runtime.onMessage`: resolves with the reply to send back
#[wasm_bindgen]
pub async fn handle_message(message: JsValue) -> Result<JsValue, JsValue> {
    let background = background()?;
    let message = from_js(message).unwrap_or(serde_json::Value::Null);

    let response = background.handle_message(message).await;
    to_js(&response)
}

/// `webNavigation.onBeforeNavigate`
#[wasm_bindgen]
pub async fn handle_navigation(details: JsValue) -> Result<(), JsValue> {
    let background = background()?;
    let event: NavigationEvent = match from_js(details) {
        Ok(event) => event,
        Err(e) => {
            log::debug!("Ignoring unreadable navigation details: {e:?}");
            return Ok(());
        }
    };

    background.handle_navigation(&event).await;
    Ok(())
}

/// `tabs.onUpdated` fallback
#[wasm_bindgen]
pub async fn handle_tab_update(tab_id: i32, change_info: JsValue, tab: JsValue) -> Result<(), JsValue> {
    let background = background()?;
    let change: TabChange = from_js(change_info).unwrap_or_default();
    let tab: TabSnapshot = from_js(tab).unwrap_or_default();

    background.handle_tab_update(tab_id, &change, &tab).await;
    Ok(())
}

/// `omnibox.onInputEntered`
#[wasm_bindgen]
pub async fn handle_omnibox_input(text: String, disposition: String) -> Result<(), JsValue> {
    let background = background()?;
    background.handle_omnibox_input(&text, &disposition).await;
    Ok(())
}

/// `omnibox.onInputChanged`: resolves with `[{content, description}]`
#[wasm_bindgen]
pub async fn omnibox_suggestions(text: String) -> Result<JsValue, JsValue> {
    let background = background()?;
    let suggestions = background.suggestions(&text).await;
    to_js(&suggestions)
}

// Re-export the recognizer for extension pages
#[wasm_bindgen]
pub fn is_go_link(url: &str) -> bool {
    recognizer::is_go_link(url)
}

#[wasm_bindgen]
pub fn extract_short_name(url: &str) -> String {
    recognizer::extract_short_name(url)
}
