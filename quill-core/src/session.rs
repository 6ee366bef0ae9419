//! Сессия пользователя и хранилище ключ-значение, в котором она живёт.

use std::collections::HashMap;
use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{SessionError, StorageError};
use crate::route::Route;

/// Ключ, под которым хранится токен сессии.
pub const TOKEN_KEY: &str = "token";

/// Хранилище строк по ключу (`localStorage` в браузере, файлы в CLI).
pub trait KeyValueStore {
    /// Читает значение.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Записывает значение.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Удаляет значение. Отсутствие ключа не считается ошибкой.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
/// Хранилище в памяти процесса.
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Пустое хранилище.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.values
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Идентификатор подписки на изменения сессии.
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(bool) + Send + Sync>;

/// Явное состояние сессии.
///
/// Признак «вошёл» выводится только из наличия непустого токена в хранилище.
/// Подписчики получают новое значение признака только когда он меняется.
/// Токен на клиенте не проверяется: просроченный токен обнаружится на первом
/// защищённом запросе.
pub struct SessionGuard<S> {
    storage: S,
    authenticated: bool,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl<S: KeyValueStore> SessionGuard<S> {
    /// Создаёт guard и сразу читает состояние из хранилища.
    pub fn new(storage: S) -> Self {
        let authenticated = read_token(&storage).is_some();
        Self {
            storage,
            authenticated,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Хранилище, поверх которого работает guard.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Есть ли сохранённый токен.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Текущий токен из хранилища.
    pub fn token(&self) -> Option<String> {
        read_token(&self.storage)
    }

    /// Сохраняет токен, выданный при входе.
    pub fn sign_in(&mut self, token: &str) -> Result<(), SessionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::MissingToken);
        }
        self.storage.set(TOKEN_KEY, token)?;
        self.update(true);
        Ok(())
    }

    /// Удаляет токен.
    pub fn sign_out(&mut self) -> Result<(), SessionError> {
        self.storage.remove(TOKEN_KEY)?;
        self.update(false);
        Ok(())
    }

    /// Перечитывает хранилище, например после изменения в другой вкладке.
    /// Возвращает актуальное значение признака.
    pub fn refresh(&mut self) -> bool {
        let authenticated = read_token(&self.storage).is_some();
        self.update(authenticated);
        authenticated
    }

    /// Подписывает слушателя на изменения признака «вошёл».
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Отписывает слушателя. Возвращает `false`, если подписки не было.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Идентификатор текущего пользователя из полезной нагрузки токена.
    pub fn current_user_id(&self) -> Result<String, SessionError> {
        let token = self.token().ok_or(SessionError::MissingToken)?;
        user_id_from_token(&token).inspect_err(|err| {
            warn!(error = %err, "cannot read current user from session token");
        })
    }

    /// Куда на самом деле попадёт пользователь, запросивший `route`.
    pub fn resolve(&self, route: Route) -> Route {
        route.resolve(self.authenticated)
    }

    fn update(&mut self, authenticated: bool) {
        if self.authenticated == authenticated {
            return;
        }
        self.authenticated = authenticated;
        debug!(authenticated, "session state changed");
        for (_, listener) in &self.listeners {
            listener(authenticated);
        }
    }
}

fn read_token<S: KeyValueStore>(storage: &S) -> Option<String> {
    match storage.get(TOKEN_KEY) {
        Ok(raw) => raw.and_then(|raw| parse_token(&raw)),
        Err(err) => {
            warn!(error = %err, "failed to read session token");
            None
        }
    }
}

fn parse_token(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[derive(Deserialize)]
struct Claims {
    user: Option<ClaimsUser>,
    id: Option<String>,
}

#[derive(Deserialize)]
struct ClaimsUser {
    id: Option<String>,
}

/// Достаёт id пользователя (`user.id` или `id`) из JWT без проверки подписи.
pub fn user_id_from_token(token: &str) -> Result<String, SessionError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => {
            return Err(SessionError::MalformedToken(
                "expected three dot-separated segments".to_string(),
            ));
        }
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|err| SessionError::MalformedToken(format!("payload is not base64url: {err}")))?;
    let claims: Claims = serde_json::from_slice(&bytes)
        .map_err(|err| SessionError::MalformedToken(format!("payload is not json: {err}")))?;

    claims
        .user
        .and_then(|user| user.id)
        .or(claims.id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| SessionError::MalformedToken("payload has no user id".to_string()))
}
