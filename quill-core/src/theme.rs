use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::{CoreError, StorageError};
use crate::session::KeyValueStore;

/// Ключ, под которым хранится тема.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Цветовая тема интерфейса.
pub enum Theme {
    /// Светлая (по умолчанию).
    #[default]
    Light,
    /// Тёмная.
    Dark,
}

impl Theme {
    /// Значение в хранилище.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Противоположная тема.
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Читает тему; отсутствие или мусор в хранилище дают светлую.
    pub fn load<S: KeyValueStore + ?Sized>(storage: &S) -> Self {
        match storage.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|err| {
                warn!(error = %err, "ignoring stored theme");
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(err) => {
                warn!(error = %err, "failed to read theme");
                Self::default()
            }
        }
    }

    /// Сохраняет тему.
    pub fn save<S: KeyValueStore + ?Sized>(self, storage: &S) -> Result<(), StorageError> {
        storage.set(THEME_KEY, self.as_str())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(CoreError::UnknownTheme(other.to_string())),
        }
    }
}
