//! Store configuration
//!
//! Defaults match the live game: one record under a versioned key, version 2,
//! 250 ms debounce and the cached character metadata kept out of saves.

use serde::{Deserialize, Serialize};

/// Storage key of the game save
pub const STORAGE_KEY: &str = "bulldogRealm_save_v2";
/// Current save format version
pub const SAVE_VERSION: u32 = 2;
/// Debounce used by `save_soon` when the caller gives none
pub const DEFAULT_SAVE_DELAY_MS: u64 = 250;
/// Derived top-level fields never written to storage
pub const DEFAULT_DERIVED_KEYS: &[&str] = &["charData"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Key of the single storage record
    pub storage_key: String,
    /// Envelope version written, and the only one trusted on load
    pub version: u32,
    /// Default debounce window
    pub save_delay_ms: u64,
    /// Top-level state keys stripped before every write
    pub derived_keys: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            version: SAVE_VERSION,
            save_delay_ms: DEFAULT_SAVE_DELAY_MS,
            derived_keys: DEFAULT_DERIVED_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl StoreConfig {
    pub fn new(storage_key: impl Into<String>, version: u32) -> Self {
        Self {
            storage_key: storage_key.into(),
            version,
            ..Self::default()
        }
    }

    pub fn with_save_delay_ms(mut self, delay_ms: u64) -> Self {
        self.save_delay_ms = delay_ms;
        self
    }

    pub fn with_derived_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.derived_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Parse overrides from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
