use quill_core::{ActionError, SessionError, ValidationErrors};
use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `quill-client`.
pub enum ClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Требуется авторизация (отсутствует/некорректен токен).
    #[error("unauthorized")]
    Unauthorized,

    /// Запрошенный ресурс не найден.
    #[error("not found")]
    NotFound,

    /// Сервер отклонил запрос; сообщения взяты из тела ответа.
    #[error("request rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),

    /// Ввод не прошёл клиентскую проверку, запрос не отправлялся.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Хостинг картинок не настроен или вернул неожиданный ответ.
    #[error("image upload failed: {0}")]
    Upload(String),

    /// Не удалось прочитать локальный файл.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка сохранения сессии.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Результат операций `quill-client`.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, messages: Vec<String>) -> Self {
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Self::Unauthorized
            }
            reqwest::StatusCode::NOT_FOUND => Self::NotFound,
            _ if messages.is_empty() => Self::Rejected(vec![format!("http status {status}")]),
            _ => Self::Rejected(messages),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, Vec::new());
        }
        Self::Http(err)
    }

    /// Сообщения для показа пользователю списком.
    ///
    /// Ошибки проверки и сообщения сервера показываются как есть, всё
    /// остальное заменяется на `fallback`.
    pub fn user_messages(&self, fallback: &str) -> Vec<String> {
        match self {
            Self::Validation(errors) => errors
                .iter()
                .map(|(field, message)| format!("{}: {message}", field.as_str()))
                .collect(),
            Self::Rejected(messages) if !messages.is_empty() => messages.clone(),
            _ => vec![fallback.to_string()],
        }
    }
}

impl From<ActionError<ClientError>> for ClientError {
    fn from(value: ActionError<ClientError>) -> Self {
        match value {
            ActionError::Validation(errors) => Self::Validation(errors),
            ActionError::Upload(err) | ActionError::Api(err) => err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn auth_statuses_map_to_unauthorized() {
        assert!(matches!(
            ClientError::from_http_status(StatusCode::UNAUTHORIZED, vec!["x".to_string()]),
            ClientError::Unauthorized
        ));
        assert!(matches!(
            ClientError::from_http_status(StatusCode::FORBIDDEN, Vec::new()),
            ClientError::Unauthorized
        ));
    }

    #[test]
    fn rejected_keeps_server_messages_or_status() {
        match ClientError::from_http_status(StatusCode::BAD_REQUEST, vec!["Title required".to_string()]) {
            ClientError::Rejected(messages) => assert_eq!(messages, vec!["Title required"]),
            other => panic!("unexpected error: {other:?}"),
        }
        match ClientError::from_http_status(StatusCode::INTERNAL_SERVER_ERROR, Vec::new()) {
            ClientError::Rejected(messages) => assert!(messages[0].contains("500")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn user_messages_fall_back_for_opaque_errors() {
        assert_eq!(
            ClientError::NotFound.user_messages("Something went wrong"),
            vec!["Something went wrong"]
        );
        assert_eq!(
            ClientError::Rejected(vec!["Email taken".to_string()]).user_messages("fallback"),
            vec!["Email taken"]
        );
    }
}
