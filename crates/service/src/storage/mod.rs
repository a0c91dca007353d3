//! Storage abstractions for the login form
//!
//! The form persists two small string records under fixed keys. Backends
//! implement [`KeyValueStorage`]; one instance backs the persistent scope,
//! another the session scope.

use async_trait::async_trait;

use crate::errors::StorageError;

pub mod json_map_store;

pub use json_map_store::JsonMapStore;

/// String key-value storage with web-storage semantics.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError>;
    /// Returns whether the key existed.
    async fn remove_item(&self, key: &str) -> Result<bool, StorageError>;
}
