//! Versioned save envelope
//!
//! Stored text is `{"v": <version>, "ts": <epoch ms>, "data": {...}}`.
//! Decoding is lenient about everything except the three things the store
//! trusts: valid JSON, an object at the top, and an object under `data`.
//! The version is checked separately so migrations can get a look at it.

use serde::Serialize;
use serde_json::Value;

use super::error::LoadError;

/// What the store writes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveEnvelope {
    /// Format version
    pub v: u32,
    /// Write time (Unix ms)
    pub ts: u64,
    /// State with derived fields stripped
    pub data: Value,
}

impl SaveEnvelope {
    pub fn new(version: u32, ts: u64, data: Value) -> Self {
        Self {
            v: version,
            ts,
            data,
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// An envelope read back from storage, version not yet validated
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEnvelope {
    /// `v` if present and a non-negative integer
    pub version: Option<u64>,
    pub ts: Option<u64>,
    pub data: Value,
}

/// Parse stored text into an envelope
pub fn decode(text: &str) -> Result<StoredEnvelope, LoadError> {
    let parsed: Value = serde_json::from_str(text)?;
    let Value::Object(mut obj) = parsed else {
        return Err(LoadError::NotAnEnvelope);
    };

    let version = obj.get("v").and_then(Value::as_u64);
    let ts = obj.get("ts").and_then(Value::as_u64);
    let data = match obj.remove("data") {
        Some(data @ Value::Object(_)) => data,
        _ => return Err(LoadError::MissingData),
    };

    Ok(StoredEnvelope { version, ts, data })
}
