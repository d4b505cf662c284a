//! Error types for the storage module.

use thiserror::Error;

/// Unified error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing a backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("Serialization error for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Key cannot be mapped to a storage location.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

impl StorageError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
