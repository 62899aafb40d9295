//! Browser `localStorage` implementation for WebAssembly.

use super::{SnapshotStore, StorageError, StorageResult};
use web_sys::Storage;

/// Snapshot storage backed by `window.localStorage`.
pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    /// Open the page's local storage.
    pub fn new() -> StorageResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("No window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("localStorage error: {:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage not available".to_string()))?;
        Ok(Self { storage })
    }
}

impl SnapshotStore for LocalStorageStore {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Other(format!("Failed to read {}: {:?}", key, e)))
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        // Browsers report a full store as a DOMException named QuotaExceededError.
        self.storage.set_item(key, value).map_err(|e| {
            let message = format!("{:?}", e);
            if message.contains("QuotaExceeded") {
                StorageError::QuotaExceeded
            } else {
                StorageError::Other(format!("Failed to write {}: {}", key, message))
            }
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| StorageError::Other(format!("Failed to remove {}: {:?}", key, e)))
    }
}
