//! Bulldog Realm - a browser virtual-pet game
//!
//! Core modules:
//! - `persistence`: Versioned, debounced save/load with deep-merge hydration
//! - `platform`: Browser/native platform abstraction (storage, time, lifecycle)
//! - `pet`: The pet state the game persists
//! - `config`: Store configuration
//! - `bindings`: The `BRState` API for page scripts (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod bindings;
pub mod config;
pub mod persistence;
pub mod pet;
pub mod platform;

pub use config::{SAVE_VERSION, STORAGE_KEY, StoreConfig};
pub use persistence::{SaveData, StateStore};
pub use pet::{Action, Character, PetState};
