use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::user_type::UserType;

/// Username + user type stamped with the wall-clock time it was written.
///
/// Both the remembered credentials and the form draft use this shape; only
/// their storage scope and retention window differ. The JSON layout is
/// `{"username": .., "userType": .., "timestamp": <ms since epoch>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRecord {
    pub username: String,
    #[serde(rename = "userType")]
    pub user_type: UserType,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Remembered login, kept in the persistent scope.
pub type CredentialRecord = LoginRecord;
/// In-progress form input, kept in the session scope.
pub type DraftRecord = LoginRecord;

impl LoginRecord {
    pub fn new(username: impl Into<String>, user_type: UserType, timestamp: i64) -> Self {
        Self { username: username.into(), user_type, timestamp }
    }

    /// Elapsed milliseconds between the write and `now_ms`.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.timestamp)
    }

    /// True once the record is strictly older than `retention`.
    pub fn is_expired(&self, now_ms: i64, retention: Duration) -> bool {
        let retention_ms = i64::try_from(retention.as_millis()).unwrap_or(i64::MAX);
        self.age_ms(now_ms) > retention_ms
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        serde_json::to_string(self).map_err(|e| ModelError::Validation(e.to_string()))
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        serde_json::from_str(raw).map_err(|e| ModelError::Validation(e.to_string()))
    }
}
