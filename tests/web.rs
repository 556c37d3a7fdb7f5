//! Browser tests against real `localStorage`, timers and page events
#![cfg(target_arch = "wasm32")]

use bulldog_realm::bindings;
use bulldog_realm::persistence::StateStore;
use bulldog_realm::platform::web::{LocalStorage, WebStore};
use bulldog_realm::platform::{Storage, SystemClock};
use bulldog_realm::{Action, Character, PetState, StoreConfig};
use js_sys::{Function, Promise};
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn config(key: &str) -> StoreConfig {
    StoreConfig::new(key, 2)
}

async fn sleep_ms(duration_ms: i32) {
    let mut resolve_slot: Option<Function> = None;
    let promise = Promise::new(&mut |resolve, _reject| {
        resolve_slot = Some(resolve);
    });
    let resolve = resolve_slot.expect("promise executor runs synchronously");
    let closure = Closure::once(move || {
        let _ = resolve.call0(&JsValue::UNDEFINED);
    });
    web_sys::window()
        .expect("window")
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            duration_ms,
        )
        .expect("setTimeout");
    closure.forget();
    JsFuture::from(promise).await.expect("timer promise");
}

fn stored_data(key: &str) -> Option<Value> {
    let raw = LocalStorage.get_item(key).unwrap()?;
    let envelope: Value = serde_json::from_str(&raw).unwrap();
    Some(envelope["data"].clone())
}

fn error_message(err: JsValue) -> String {
    err.dyn_into::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .unwrap_or_default()
}

#[wasm_bindgen_test]
fn local_storage_round_trip() {
    let key = "bulldog_realm_test_round_trip";
    let _ = LocalStorage.remove_item(key);

    let mut store = StateStore::init(&PetState::default(), LocalStorage, SystemClock, config(key));
    store.state_mut().select_character(Character::Cotton);
    store.state_mut().gold = 42;
    store.save_now();

    let next = StateStore::init(&PetState::default(), LocalStorage, SystemClock, config(key));
    assert_eq!(next.state().gold, 42);
    assert_eq!(next.state().char_data, Some(Character::Cotton.meta()));

    let raw = LocalStorage.get_item(key).unwrap().unwrap();
    assert!(!raw.contains("charData"));
    let _ = LocalStorage.remove_item(key);
}

#[wasm_bindgen_test]
fn garbage_in_local_storage_is_ignored() {
    let key = "bulldog_realm_test_garbage";
    LocalStorage.set_item(key, "{{{").unwrap();
    let store = StateStore::init(&PetState::default(), LocalStorage, SystemClock, config(key));
    assert_eq!(store.state(), &PetState::default());
    assert!(store.load_raw().is_none());
    let _ = LocalStorage.remove_item(key);
}

#[wasm_bindgen_test]
async fn save_soon_burst_writes_last_state_once() {
    let key = "bulldog_realm_test_debounce";
    let _ = LocalStorage.remove_item(key);
    let web = WebStore::init(&PetState::default(), config(key));

    for gold in [1, 2, 3] {
        web.store().borrow_mut().state_mut().gold = gold;
        web.save_soon(Some(100)).unwrap();
    }
    assert!(LocalStorage.get_item(key).unwrap().is_none());

    sleep_ms(150).await;
    assert_eq!(stored_data(key).unwrap()["gold"], Value::from(3));
    assert!(!web.store().borrow().has_pending_save());

    // No superseded timer is left to write again
    LocalStorage.remove_item(key).unwrap();
    sleep_ms(150).await;
    assert!(LocalStorage.get_item(key).unwrap().is_none());
}

#[wasm_bindgen_test]
async fn page_hide_flushes_pending_save() {
    let key = "bulldog_realm_test_autosave";
    let _ = LocalStorage.remove_item(key);
    let web = WebStore::init(&PetState::default(), config(key));
    web.install_autosave().unwrap();

    web.store().borrow_mut().update(|pet| {
        pet.select_character(Character::Titan);
        pet.apply(Action::Train);
    });
    web.save_soon(Some(10_000)).unwrap();
    assert!(LocalStorage.get_item(key).unwrap().is_none());

    let window = web_sys::window().unwrap();
    let event = web_sys::Event::new("pagehide").unwrap();
    window.dispatch_event(&event).unwrap();

    let data = stored_data(key).unwrap();
    assert_eq!(data["selectedChar"], Value::from("titan"));
    assert_eq!(data["xp"], Value::from(5));
    assert!(!web.store().borrow().has_pending_save());

    // Unload flushes too, even with nothing pending
    LocalStorage.remove_item(key).unwrap();
    let event = web_sys::Event::new("beforeunload").unwrap();
    window.dispatch_event(&event).unwrap();
    assert_eq!(stored_data(key).unwrap()["xp"], Value::from(5));
    let _ = LocalStorage.remove_item(key);
}

// The page session is global, so the whole lifecycle lives in one test
#[wasm_bindgen_test]
fn page_api_requires_single_init() {
    let _ = LocalStorage.remove_item(bulldog_realm::STORAGE_KEY);

    let err = bindings::get_state().unwrap_err();
    assert_eq!(error_message(err), "state store not initialized");
    assert!(bindings::save_now().is_err());
    assert!(bindings::set_state(JsValue::from_str("{}")).is_err());

    let default = js_sys::JSON::parse(r#"{"level":1,"gold":0}"#).unwrap();
    bindings::init(default.clone()).unwrap();
    let err = bindings::init(default).unwrap_err();
    assert_eq!(error_message(err), "state store already initialized");

    assert!(bindings::set_state(JsValue::UNDEFINED).is_err());
    let patch = js_sys::JSON::parse(r#"{"gold":9}"#).unwrap();
    bindings::set_state(patch).unwrap();
    bindings::save_now().unwrap();

    let raw = bindings::load_raw().unwrap();
    let gold = js_sys::Reflect::get(&raw, &JsValue::from_str("gold")).unwrap();
    assert_eq!(gold.as_f64(), Some(9.0));

    bindings::clear().unwrap();
    assert!(bindings::load_raw().unwrap().is_null());
}
