//! Save/load of the game state
//!
//! Features:
//! - Versioned JSON envelope (`{v, ts, data}`)
//! - Deep-merge hydration over a default template
//! - Derived fields stripped before every write
//! - Debounced and immediate saves, best-effort (never fails the game)
//! - Optional migration chain for older save versions

pub mod debounce;
pub mod envelope;
pub mod error;
pub mod merge;
pub mod migration;
pub mod store;

pub use error::{LoadError, StoreError};
pub use merge::merge_into;
pub use migration::MigrationChain;
pub use store::{SaveData, StateStore};
