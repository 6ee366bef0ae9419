use anyhow::{Context, Result, anyhow};

/// API по умолчанию (локальный backend).
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
/// Настройки клиента.
pub struct ClientSettings {
    /// Базовый URL REST API.
    pub api_url: String,
    /// Эндпоинт загрузки картинок на внешний хостинг.
    pub upload_url: Option<String>,
    /// `upload_preset` для хостинга картинок.
    pub upload_preset: Option<String>,
    /// Таймаут установки соединения, секунды.
    pub connect_timeout_secs: u64,
    /// Таймаут всего запроса, секунды.
    pub request_timeout_secs: u64,
    /// Уровень логирования по умолчанию.
    pub log_level: String,
}

impl ClientSettings {
    /// Настройки по умолчанию с указанным API.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            upload_url: None,
            upload_preset: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: "warn".to_string(),
        }
    }

    /// Читает настройки из переменных окружения.
    ///
    /// `QUILL_API_URL`, `QUILL_UPLOAD_URL`, `QUILL_UPLOAD_PRESET`,
    /// `QUILL_CONNECT_TIMEOUT_SECS`, `QUILL_REQUEST_TIMEOUT_SECS`,
    /// `LOG_LEVEL` (или `RUST_LOG`).
    pub fn from_env() -> Result<Self> {
        let api_url = get_optional("QUILL_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let upload_url = get_optional("QUILL_UPLOAD_URL");
        let upload_preset = get_optional("QUILL_UPLOAD_PRESET");
        let connect_timeout_secs =
            parse_u64_env("QUILL_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?;
        let request_timeout_secs =
            parse_u64_env("QUILL_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "warn".to_string());

        Ok(Self {
            api_url,
            upload_url,
            upload_preset,
            connect_timeout_secs,
            request_timeout_secs,
            log_level,
        })
    }

    /// Заменяет базовый URL API.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

fn get_optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_default_timeouts() {
        let settings = ClientSettings::new("http://api.local");
        assert_eq!(settings.api_url, "http://api.local");
        assert_eq!(settings.connect_timeout_secs, 5);
        assert_eq!(settings.request_timeout_secs, 15);
        assert!(settings.upload_url.is_none());
    }

    #[test]
    fn with_api_url_overrides_base() {
        let settings = ClientSettings::new(DEFAULT_API_URL).with_api_url("http://other/api");
        assert_eq!(settings.api_url, "http://other/api");
    }
}
