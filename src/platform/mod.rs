//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web, files natively, memory in tests)
//! - Time
//! - Visibility/unload detection

pub mod lifecycle;
pub mod storage;
pub mod time;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use lifecycle::{LifecycleEvent, Visibility};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
pub use storage::{MemoryStorage, Storage, StorageError};
pub use time::{Clock, ManualClock, SystemClock};
