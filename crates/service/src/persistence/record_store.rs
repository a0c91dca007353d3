use std::sync::Arc;
use std::time::Duration;

use models::{LoginRecord, UserType};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::errors::StorageError;
use crate::storage::KeyValueStorage;

/// One expiring [`LoginRecord`] stored as JSON under a fixed key.
#[derive(Clone)]
pub struct RecordStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    retention: Duration,
    clock: Arc<dyn Clock>,
}

impl RecordStore {
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        key: impl Into<String>,
        retention: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { storage, key: key.into(), retention, clock }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Write a record stamped with the current time.
    pub async fn save(&self, username: &str, user_type: UserType) -> Result<LoginRecord, StorageError> {
        let record = LoginRecord::new(username, user_type, self.clock.now_ms());
        self.storage.set_item(&self.key, record.to_json()?).await?;
        debug!(key = %self.key, %user_type, "record_saved");
        Ok(record)
    }

    /// Strict read: missing is `Ok(None)`, unparseable is an error.
    pub async fn read(&self) -> Result<Option<LoginRecord>, StorageError> {
        let Some(raw) = self.storage.get_item(&self.key).await? else {
            return Ok(None);
        };
        LoginRecord::from_json(&raw)
            .map(Some)
            .map_err(|e| StorageError::malformed(&self.key, e))
    }

    /// Fail-soft read. Malformed, unreadable, and expired records are removed
    /// and reported as absent.
    pub async fn load(&self) -> Option<LoginRecord> {
        let record = match self.read().await {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %self.key, code = e.code(), error = %e, "discarding unreadable record");
                self.clear_quietly().await;
                return None;
            }
        };

        let now = self.clock.now_ms();
        if record.is_expired(now, self.retention) {
            debug!(key = %self.key, age_ms = record.age_ms(now), "record_expired");
            self.clear_quietly().await;
            return None;
        }
        Some(record)
    }

    /// Remove the record unconditionally; returns whether one existed.
    pub async fn clear(&self) -> Result<bool, StorageError> {
        let existed = self.storage.remove_item(&self.key).await?;
        if existed {
            debug!(key = %self.key, "record_cleared");
        }
        Ok(existed)
    }

    async fn clear_quietly(&self) {
        if let Err(e) = self.clear().await {
            warn!(key = %self.key, code = e.code(), error = %e, "failed to remove record");
        }
    }
}
