/// Adapters over the extension host, via the JS bridge in `host.js`

use crate::backend::StorageArea;
use crate::error::{HostError, StorageError};
use crate::resolver::{Navigator, RedirectRequest, TabTarget};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/host.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn storageGet(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn storageSet(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn storageRemove(key: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateTab(tab_id: i32, url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateActiveTab(url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn createTab(url: &str) -> Result<(), JsValue>;

    fn extensionUrl(path: &str) -> String;
}

/// Serialize for JS: maps become plain objects and `None` becomes `null`
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(JsValue::from)
}

pub fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(JsValue::from)
}

/// Best-effort readable message out of a thrown JS value
pub fn js_error_message(error: &JsValue) -> String {
    if let Some(error) = error.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    error.as_string().unwrap_or_else(|| format!("{error:?}"))
}

/// The extension's local storage area
pub struct ExtensionStorage;

#[async_trait(?Send)]
impl StorageArea for ExtensionStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let value = storageGet(key)
            .await
            .map_err(|e| StorageError(js_error_message(&e)))?;

        if value.is_undefined() || value.is_null() {
            return Ok(None);
        }

        from_js(value)
            .map(Some)
            .map_err(|e| StorageError(format!("Failed to parse storage: {}", js_error_message(&e))))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let value = to_js(&value)
            .map_err(|e| StorageError(format!("Failed to serialize storage: {}", js_error_message(&e))))?;

        storageSet(key, value)
            .await
            .map_err(|e| StorageError(js_error_message(&e)))
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        storageRemove(key)
            .await
            .map_err(|e| StorageError(js_error_message(&e)))
    }
}

/// The extension's tab control
pub struct ExtensionTabs;

#[async_trait(?Send)]
impl Navigator for ExtensionTabs {
    async fn redirect(&self, request: &RedirectRequest) -> Result<(), HostError> {
        let result = match request.target {
            TabTarget::Existing(tab_id) => updateTab(tab_id, &request.url).await,
            TabTarget::Active => updateActiveTab(&request.url).await,
            TabTarget::New => createTab(&request.url).await,
        };

        result.map_err(|e| HostError(js_error_message(&e)))
    }

    fn extension_url(&self, path: &str) -> String {
        extensionUrl(path)
    }
}
