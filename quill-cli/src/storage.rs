use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quill_core::{KeyValueStore, StorageError};

/// Каталог состояния по умолчанию (относительно текущего каталога).
pub const DEFAULT_STATE_DIR: &str = ".quill";

#[derive(Debug, Clone)]
/// Хранилище ключ-значение: один файл на ключ в каталоге состояния.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(io_error(key, "key must be alphanumeric"));
        }
        Ok(self.dir.join(key))
    }
}

fn io_error(key: &str, message: impl ToString) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        message: message.to_string(),
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)?) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(key, err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path(key)?;
        fs::create_dir_all(&self.dir).map_err(|err| io_error(key, err))?;
        fs::write(path, value).map_err(|err| io_error(key, err))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(key, err)),
        }
    }
}
