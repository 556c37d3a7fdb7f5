//! `BRState`: the store as seen from page scripts
//!
//! One session per page, created by `init`. JS objects cross the boundary as
//! JSON, so `getState` returns a snapshot; scripts write back through
//! `setState` and then call `saveSoon`/`saveNow`. Every call before `init`
//! throws "state store not initialized".

use std::cell::RefCell;

use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::config::{SAVE_VERSION, STORAGE_KEY, StoreConfig};
use crate::persistence::StoreError;
use crate::platform::web::WebStore;

thread_local! {
    static SESSION: RefCell<Option<WebStore<Value>>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Bulldog Realm state store loaded");
}

fn store_error(e: StoreError) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

fn to_json(value: &JsValue) -> Result<Value, JsValue> {
    let text = js_sys::JSON::stringify(value)?
        .as_string()
        .ok_or_else(|| js_sys::Error::new("value is not JSON-serializable"))?;
    serde_json::from_str(&text).map_err(|e| js_sys::Error::new(&e.to_string()).into())
}

fn to_js(value: &Value) -> Result<JsValue, JsValue> {
    let text = serde_json::to_string(value)
        .map_err(|e| JsValue::from(js_sys::Error::new(&e.to_string())))?;
    js_sys::JSON::parse(&text)
}

fn with_session<R>(f: impl FnOnce(&WebStore<Value>) -> Result<R, JsValue>) -> Result<R, JsValue> {
    SESSION.with(|session| {
        let session = session.borrow();
        let session = session
            .as_ref()
            .ok_or_else(|| store_error(StoreError::NotInitialized))?;
        f(session)
    })
}

/// Create the session from a default template, load any save and install
/// the autosave hooks. Returns the hydrated state.
#[wasm_bindgen(js_name = init)]
pub fn init(default_state: JsValue) -> Result<JsValue, JsValue> {
    if SESSION.with(|s| s.borrow().is_some()) {
        return Err(store_error(StoreError::AlreadyInitialized));
    }
    let default = to_json(&default_state)?;
    let session = WebStore::init(&default, StoreConfig::default());
    session.install_autosave()?;
    let state = to_js(session.store().borrow().state())?;
    SESSION.with(|s| *s.borrow_mut() = Some(session));
    Ok(state)
}

#[wasm_bindgen(js_name = getState)]
pub fn get_state() -> Result<JsValue, JsValue> {
    with_session(|session| to_js(session.store().borrow().state()))
}

/// Deep-merge `partial` into the live state
#[wasm_bindgen(js_name = setState)]
pub fn set_state(partial: JsValue) -> Result<(), JsValue> {
    let partial = to_json(&partial)?;
    with_session(|session| {
        session
            .store()
            .borrow_mut()
            .patch(&partial)
            .map_err(store_error)
    })
}

#[wasm_bindgen(js_name = saveNow)]
pub fn save_now() -> Result<(), JsValue> {
    with_session(|session| {
        session.store().borrow_mut().save_now();
        Ok(())
    })
}

/// Older page scripts call `BRState.save()`
#[wasm_bindgen(js_name = save)]
pub fn save() -> Result<(), JsValue> {
    save_now()
}

#[wasm_bindgen(js_name = saveSoon)]
pub fn save_soon(delay_ms: Option<f64>) -> Result<(), JsValue> {
    let delay = delay_ms.map(|ms| ms.max(0.0) as u64);
    with_session(|session| session.save_soon(delay))
}

/// Validated stored data, or `null`
#[wasm_bindgen(js_name = loadRaw)]
pub fn load_raw() -> Result<JsValue, JsValue> {
    with_session(|session| match session.store().borrow().load_raw() {
        Some(data) => to_js(&data),
        None => Ok(JsValue::NULL),
    })
}

#[wasm_bindgen(js_name = clear)]
pub fn clear() -> Result<(), JsValue> {
    with_session(|session| {
        session
            .store()
            .borrow_mut()
            .clear()
            .map_err(|e| {
                log::warn!("Clearing save failed: {}", e);
                store_error(e)
            })
    })
}

#[wasm_bindgen(js_name = storageKey)]
pub fn storage_key() -> String {
    STORAGE_KEY.to_string()
}

#[wasm_bindgen(js_name = saveVersion)]
pub fn save_version() -> u32 {
    SAVE_VERSION
}

