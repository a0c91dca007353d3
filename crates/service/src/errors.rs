use thiserror::Error;

/// Failures raised by the key-value storage backends and record stores.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("malformed stored record under {key}: {reason}")]
    MalformedStoredRecord { key: String, reason: String },
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl StorageError {
    pub fn malformed(key: &str, reason: impl ToString) -> Self {
        Self::MalformedStoredRecord { key: key.to_string(), reason: reason.to_string() }
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            StorageError::MalformedStoredRecord { .. } => 3001,
            StorageError::Backend(_) => 3002,
            StorageError::Model(_) => 3003,
        }
    }
}
