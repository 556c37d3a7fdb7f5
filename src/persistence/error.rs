//! Persistence error types

use thiserror::Error;

use crate::platform::storage::StorageError;

/// Why a stored save was not used
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no save stored")]
    Missing,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("save is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("save envelope is not an object")]
    NotAnEnvelope,
    #[error("save version {found:?} does not match {expected}")]
    VersionMismatch { found: Option<u64>, expected: u32 },
    #[error("save envelope has no data object")]
    MissingData,
    #[error("no migration from save version {from}")]
    MigrationFailed { from: u32 },
}

/// Failure of a store operation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to encode state: {0}")]
    Encode(serde_json::Error),
    #[error("state does not match its schema: {0}")]
    Schema(serde_json::Error),
    #[error("state store not initialized")]
    NotInitialized,
    #[error("state store already initialized")]
    AlreadyInitialized,
}
