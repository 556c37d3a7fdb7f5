//! Version gate and optional upgrade steps
//!
//! With no steps registered, any envelope whose version differs from the
//! current one is rejected. A step registered for version `n` turns `n` data
//! into `n + 1` data; older saves walk the chain up to the current version.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use super::envelope::StoredEnvelope;
use super::error::LoadError;

type Step = Box<dyn Fn(Value) -> Option<Value>>;

#[derive(Default)]
pub struct MigrationChain {
    steps: BTreeMap<u32, Step>,
}

impl fmt::Debug for MigrationChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationChain")
            .field("from_versions", &self.steps.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MigrationChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the step upgrading `from` data to `from + 1`
    pub fn with_step<F>(mut self, from: u32, step: F) -> Self
    where
        F: Fn(Value) -> Option<Value> + 'static,
    {
        self.steps.insert(from, Box::new(step));
        self
    }

    /// Validate the envelope version against `current` and return data in
    /// the current shape
    pub fn upgrade(&self, stored: StoredEnvelope, current: u32) -> Result<Value, LoadError> {
        let mismatch = LoadError::VersionMismatch {
            found: stored.version,
            expected: current,
        };
        let Some(found) = stored.version else {
            return Err(mismatch);
        };
        if found == u64::from(current) {
            return Ok(stored.data);
        }
        if found > u64::from(current) || self.steps.is_empty() {
            return Err(mismatch);
        }

        let mut data = stored.data;
        for from in (found as u32)..current {
            let step = self
                .steps
                .get(&from)
                .ok_or(LoadError::MigrationFailed { from })?;
            data = match step(data) {
                Some(next @ Value::Object(_)) => next,
                _ => return Err(LoadError::MigrationFailed { from }),
            };
            log::info!("Migrated save from version {} to {}", from, from + 1);
        }
        Ok(data)
    }
}
