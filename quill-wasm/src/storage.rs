use quill_core::{KeyValueStore, StorageError};

/// `localStorage` текущего origin.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BrowserStorage;

fn local_storage() -> Result<web_sys::Storage, StorageError> {
    let window = web_sys::window()
        .ok_or_else(|| StorageError::Unavailable("window is not available".to_string()))?;
    window
        .local_storage()
        .map_err(|_| StorageError::Unavailable("failed to access localStorage".to_string()))?
        .ok_or_else(|| StorageError::Unavailable("localStorage is not available".to_string()))
}

fn io_error(key: &str, message: &str) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        message: message.to_string(),
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        local_storage()?
            .get_item(key)
            .map_err(|_| io_error(key, "failed to read"))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        local_storage()?
            .set_item(key, value)
            .map_err(|_| io_error(key, "failed to save"))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        local_storage()?
            .remove_item(key)
            .map_err(|_| io_error(key, "failed to clear"))
    }
}
