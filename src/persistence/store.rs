//! The state store
//!
//! Owns the one canonical game state for the session. Hydration deep-merges
//! the stored save over the caller's default template and validates the
//! result against `T`; saves strip derived keys and write the whole envelope
//! (last write wins). Persistence is best-effort: [`StateStore::save_now`]
//! and [`StateStore::load_raw`] log failures and carry on, so storage
//! trouble never interrupts play.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::debounce::Debouncer;
use super::envelope::{self, SaveEnvelope};
use super::error::{LoadError, StoreError};
use super::merge::{merge_into, strip_keys};
use super::migration::MigrationChain;
use crate::config::StoreConfig;
use crate::platform::lifecycle::LifecycleEvent;
use crate::platform::storage::Storage;
use crate::platform::time::{Clock, SystemClock};

/// State the store can persist
pub trait SaveData: Serialize + DeserializeOwned + Clone {
    /// Recompute derived fields and coerce out-of-range values.
    /// Runs after every hydration and patch.
    fn normalize(&mut self) {}
}

/// Untyped templates: any JSON object shape
impl SaveData for Value {}

pub struct StateStore<T, S, C = SystemClock> {
    config: StoreConfig,
    storage: S,
    clock: C,
    migrations: MigrationChain,
    state: T,
    pending: Debouncer,
}

impl<T: SaveData, S: Storage, C: Clock> StateStore<T, S, C> {
    /// Build the session state from `default` plus whatever valid save is in
    /// `storage`. Does not touch any page lifecycle hooks.
    pub fn init(default: &T, storage: S, clock: C, config: StoreConfig) -> Self {
        Self::init_with_migrations(default, storage, clock, config, MigrationChain::new())
    }

    /// Like [`StateStore::init`], upgrading older saves through `migrations`
    pub fn init_with_migrations(
        default: &T,
        storage: S,
        clock: C,
        config: StoreConfig,
        migrations: MigrationChain,
    ) -> Self {
        let mut store = Self {
            config,
            storage,
            clock,
            migrations,
            state: default.clone(),
            pending: Debouncer::new(),
        };

        match store.hydrate(default) {
            Ok(Some(state)) => {
                store.state = state;
                log::info!("Loaded save from {:?}", store.config.storage_key);
            }
            Ok(None) => log::info!("No usable save, starting from defaults"),
            Err(e) => log::warn!("Discarding save that does not fit the state: {}", e),
        }
        store.state.normalize();
        store
    }

    fn hydrate(&self, default: &T) -> Result<Option<T>, StoreError> {
        let Some(loaded) = self.load_raw() else {
            return Ok(None);
        };
        let mut merged = serde_json::to_value(default).map_err(StoreError::Encode)?;
        merge_into(&mut merged, &loaded);
        let state = serde_json::from_value(merged).map_err(StoreError::Schema)?;
        Ok(Some(state))
    }

    /// The live state
    pub fn state(&self) -> &T {
        &self.state
    }

    /// The live state, for in-place mutation. Call a save afterwards.
    pub fn state_mut(&mut self) -> &mut T {
        &mut self.state
    }

    /// Mutate the state and schedule a debounced save. Like
    /// [`StateStore::save_soon`], nothing is written until the host flushes.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.state);
        self.save_soon(None);
        result
    }

    /// Deep-merge a partial object into the state. A patch that would not
    /// fit `T` is rejected and the state is left as it was.
    pub fn patch(&mut self, partial: &Value) -> Result<(), StoreError> {
        let mut merged = serde_json::to_value(&self.state).map_err(StoreError::Encode)?;
        merge_into(&mut merged, partial);
        let mut next: T = serde_json::from_value(merged).map_err(StoreError::Schema)?;
        next.normalize();
        self.state = next;
        Ok(())
    }

    /// Serialized envelope for the current state
    pub fn encode(&self) -> Result<String, StoreError> {
        let mut data = serde_json::to_value(&self.state).map_err(StoreError::Encode)?;
        strip_keys(&mut data, self.config.derived_keys.as_slice());
        SaveEnvelope::new(self.config.version, self.clock.now_ms(), data)
            .encode()
            .map_err(StoreError::Encode)
    }

    /// Write the state now, reporting failure. Cancels any pending
    /// debounced save.
    pub fn try_save_now(&mut self) -> Result<(), StoreError> {
        self.pending.take();
        let text = self.encode()?;
        self.storage.set_item(&self.config.storage_key, &text)?;
        log::debug!("Saved {} bytes to {:?}", text.len(), self.config.storage_key);
        Ok(())
    }

    /// Write the state now. Failures (quota, disabled storage) are logged
    /// and dropped; the in-memory state stays authoritative.
    pub fn save_now(&mut self) {
        if let Err(e) = self.try_save_now() {
            log::warn!("Save failed, keeping in-memory state: {}", e);
        }
    }

    /// Schedule a save `delay_ms` from now (config default when `None`),
    /// replacing any pending one. Returns the delay used.
    ///
    /// This only records a deadline. The host must call
    /// [`StateStore::flush_due`] while polling, or [`StateStore::flush_pending`]
    /// from a timer armed for the returned delay, as `WebStore` does.
    pub fn save_soon(&mut self, delay_ms: Option<u64>) -> u64 {
        let delay = delay_ms.unwrap_or(self.config.save_delay_ms);
        self.pending.schedule(self.clock.now_ms(), delay);
        delay
    }

    /// Run the pending save if its deadline has passed
    pub fn flush_due(&mut self) -> bool {
        if self.pending.is_due(self.clock.now_ms()) {
            self.save_now();
            true
        } else {
            false
        }
    }

    /// Run the pending save regardless of its deadline
    pub fn flush_pending(&mut self) -> bool {
        if self.pending.is_pending() {
            self.save_now();
            true
        } else {
            false
        }
    }

    pub fn has_pending_save(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn pending_deadline(&self) -> Option<u64> {
        self.pending.deadline()
    }

    /// React to a page lifecycle event; hide and unload flush immediately
    pub fn handle_lifecycle(&mut self, event: LifecycleEvent) -> bool {
        if !event.flushes() {
            return false;
        }
        log::debug!("{} event, flushing save", event.dom_name());
        self.save_now();
        true
    }

    /// Stored `data` if present, well-formed and of the current version
    /// (after migrations), with derived keys removed
    pub fn try_load_raw(&self) -> Result<Value, LoadError> {
        let text = match self.storage.get_item(&self.config.storage_key)? {
            Some(text) if !text.is_empty() => text,
            _ => return Err(LoadError::Missing),
        };
        let stored = envelope::decode(&text)?;
        if let Some(ts) = stored.ts {
            log::debug!("Stored save written at {} ms", ts);
        }
        let mut data = self.migrations.upgrade(stored, self.config.version)?;
        strip_keys(&mut data, self.config.derived_keys.as_slice());
        Ok(data)
    }

    /// [`StateStore::try_load_raw`] with every failure mapped to `None`
    pub fn load_raw(&self) -> Option<Value> {
        match self.try_load_raw() {
            Ok(data) => Some(data),
            Err(LoadError::Missing) => None,
            Err(e) => {
                log::debug!("Ignoring stored save: {}", e);
                None
            }
        }
    }

    /// Delete the stored save and drop any pending save
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.pending.take();
        self.storage.remove_item(&self.config.storage_key)?;
        log::info!("Save cleared");
        Ok(())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
