//! Browser glue: `localStorage`, lifecycle listeners and the debounce timer

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::VisibilityState;

use super::lifecycle::{LifecycleEvent, Visibility};
use super::storage::{Storage, StorageError};
use super::time::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::persistence::{SaveData, StateStore};

/// Readable message from a thrown JS value
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// `window.localStorage`, looked up on every call so a page that loses
/// storage mid-session degrades instead of panicking
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Js(js_error_message(&e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_string()))
    }
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Js(js_error_message(&e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Js(js_error_message(&e)))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Js(js_error_message(&e)))
    }
}

/// A store shared between page API, timers and listeners
pub type Shared<T, S, C> = Rc<RefCell<StateStore<T, S, C>>>;

fn dispatch<T: SaveData, S: Storage, C: Clock>(store: &Shared<T, S, C>, event: LifecycleEvent) {
    match store.try_borrow_mut() {
        Ok(mut store) => {
            store.handle_lifecycle(event);
        }
        Err(_) => log::warn!("Store busy during {}, save skipped", event.dom_name()),
    }
}

/// Flush the store on `pagehide`, `visibilitychange` to hidden and
/// `beforeunload`. Listeners live for the rest of the page.
pub fn install_autosave<T, S, C>(store: Shared<T, S, C>) -> Result<(), JsValue>
where
    T: SaveData + 'static,
    S: Storage + 'static,
    C: Clock + 'static,
{
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // Page hide (capture phase, fires before bfcache/unload on mobile)
    {
        let store = store.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            dispatch(&store, LifecycleEvent::PageHide);
        });
        window.add_event_listener_with_callback_and_bool(
            "pagehide",
            closure.as_ref().unchecked_ref(),
            true,
        )?;
        closure.forget();
    }

    // Visibility change (tab switch, app switch, screen off)
    {
        let store = store.clone();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let visibility = if document_clone.visibility_state() == VisibilityState::Hidden {
                Visibility::Hidden
            } else {
                Visibility::Visible
            };
            dispatch(&store, LifecycleEvent::VisibilityChange(visibility));
        });
        document.add_event_listener_with_callback(
            "visibilitychange",
            closure.as_ref().unchecked_ref(),
        )?;
        closure.forget();
    }

    // Before unload
    {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            dispatch(&store, LifecycleEvent::BeforeUnload);
        });
        window.add_event_listener_with_callback("beforeunload", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    log::info!("Autosave hooks installed");
    Ok(())
}

/// An armed `setTimeout`. The callback stays owned here until the timer is
/// replaced, never dropped from inside its own invocation.
struct PendingTimer {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

/// A store backed by `localStorage` whose debounced saves run on a real
/// browser timer
pub struct WebStore<T: SaveData + 'static> {
    store: Shared<T, LocalStorage, SystemClock>,
    timer: RefCell<Option<PendingTimer>>,
}

impl<T: SaveData + 'static> WebStore<T> {
    /// Hydrate from `localStorage`. Call [`WebStore::install_autosave`] to
    /// wire the page lifecycle.
    pub fn init(default: &T, config: StoreConfig) -> Self {
        let store = StateStore::init(default, LocalStorage, SystemClock, config);
        Self {
            store: Rc::new(RefCell::new(store)),
            timer: RefCell::new(None),
        }
    }

    pub fn install_autosave(&self) -> Result<(), JsValue> {
        install_autosave(self.store.clone())
    }

    pub fn store(&self) -> &Shared<T, LocalStorage, SystemClock> {
        &self.store
    }

    /// Debounced save: cancels the previous timer and arms a new one
    pub fn save_soon(&self, delay_ms: Option<u64>) -> Result<(), JsValue> {
        let delay = self.store.borrow_mut().save_soon(delay_ms);
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

        if let Some(previous) = self.timer.borrow_mut().take() {
            window.clear_timeout_with_handle(previous.handle);
        }

        let store = self.store.clone();
        let callback = Closure::<dyn FnMut()>::new(move || match store.try_borrow_mut() {
            Ok(mut store) => {
                store.flush_pending();
            }
            Err(_) => log::warn!("Store busy when debounce timer fired, save skipped"),
        });
        let handle = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay.min(i32::MAX as u64) as i32,
        )?;
        *self.timer.borrow_mut() = Some(PendingTimer {
            handle,
            _callback: callback,
        });
        Ok(())
    }
}
