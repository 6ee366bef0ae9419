use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
/// Ошибки разбора доменных значений.
pub enum CoreError {
    /// Неизвестный тип реакции.
    #[error("unknown reaction type: '{0}' (expected like, love or laugh)")]
    UnknownReaction(String),

    /// Неизвестное значение темы.
    #[error("unknown theme: '{0}' (expected dark or light)")]
    UnknownTheme(String),
}

#[derive(Debug, Error)]
/// Ошибки хранилища ключ-значение.
pub enum StorageError {
    /// Хранилище недоступно (нет `window`, запрещён `localStorage`, нет каталога).
    #[error("storage is not available: {0}")]
    Unavailable(String),

    /// Чтение или запись завершились ошибкой.
    #[error("storage io failed for key '{key}': {message}")]
    Io {
        /// Ключ, с которым работали.
        key: String,
        /// Описание ошибки.
        message: String,
    },
}

#[derive(Debug, Error)]
/// Ошибки работы с сессией.
pub enum SessionError {
    /// Учётные данные отсутствуют.
    #[error("not signed in")]
    MissingToken,

    /// Токен не удалось разобрать как JWT с идентификатором пользователя.
    #[error("session token is malformed: {0}")]
    MalformedToken(String),

    /// Ошибка хранилища сессии.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
/// Ошибка операции над постом.
///
/// `E` — ошибка транспорта конкретного клиента (HTTP на хосте, `fetch` в браузере).
pub enum ActionError<E>
where
    E: std::error::Error + 'static,
{
    /// Ввод не прошёл клиентскую проверку, запрос не отправлялся.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Загрузка картинки на внешний хостинг не удалась, пост не создавался.
    #[error("image upload failed: {0}")]
    Upload(#[source] E),

    /// Запрос к API завершился ошибкой.
    #[error(transparent)]
    Api(E),
}
