use std::sync::Arc;
use std::time::Duration;

use models::{CredentialRecord, UserType};

use crate::clock::Clock;
use crate::errors::StorageError;
use crate::persistence::record_store::RecordStore;
use crate::storage::KeyValueStorage;

pub const CREDENTIALS_KEY: &str = "caoa_credentials";
pub const CREDENTIAL_RETENTION: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// "Remember me" record in the persistent scope. Holds the username and
/// user type only; the password is never stored.
#[derive(Clone)]
pub struct CredentialStore {
    record: RecordStore,
}

impl CredentialStore {
    pub fn new(record: RecordStore) -> Self {
        Self { record }
    }

    /// Store with the default key and 30-day retention.
    pub fn with_defaults(storage: Arc<dyn KeyValueStorage>, clock: Arc<dyn Clock>) -> Self {
        Self::new(RecordStore::new(storage, CREDENTIALS_KEY, CREDENTIAL_RETENTION, clock))
    }

    /// Remember `username` and `user_type`, stamped with the current time.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use models::UserType;
    /// use service::clock::ManualClock;
    /// use service::persistence::CredentialStore;
    /// use service::storage::JsonMapStore;
    /// let creds = CredentialStore::with_defaults(JsonMapStore::in_memory(), Arc::new(ManualClock::new(42)));
    /// let rec = tokio_test::block_on(creds.save("a@b.com", UserType::Employee)).unwrap();
    /// assert_eq!(rec.timestamp, 42);
    /// assert_eq!(tokio_test::block_on(creds.load()), Some(rec));
    /// ```
    pub async fn save(&self, username: &str, user_type: UserType) -> Result<CredentialRecord, StorageError> {
        self.record.save(username, user_type).await
    }

    pub async fn load(&self) -> Option<CredentialRecord> {
        self.record.load().await
    }

    pub async fn clear(&self) -> Result<bool, StorageError> {
        self.record.clear().await
    }
}
