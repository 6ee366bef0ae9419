use async_trait::async_trait;

use crate::model::{PartialPost, Post, ReactionKind};
use crate::validation::PostDraft;

/// Удалённый API постов, которым пользуются операции из [`crate::actions`].
///
/// Реализации сами подставляют токен сессии. Фьючерсы не обязаны быть `Send`:
/// в браузере всё выполняется на одном потоке.
#[async_trait(?Send)]
pub trait BlogApi {
    /// Ошибка транспорта.
    type Error: std::error::Error + 'static;

    /// `GET /posts`
    async fn list_posts(&self) -> Result<Vec<Post>, Self::Error>;

    /// `GET /posts/:id`
    async fn get_post(&self, id: &str) -> Result<Post, Self::Error>;

    /// `POST /posts`
    async fn create_post(&self, draft: &PostDraft, image: Option<&str>)
    -> Result<Post, Self::Error>;

    /// `PUT /posts/:id`
    async fn update_post(&self, id: &str, draft: &PostDraft) -> Result<PartialPost, Self::Error>;

    /// `DELETE /posts/:id`
    async fn delete_post(&self, id: &str) -> Result<(), Self::Error>;

    /// `POST /posts/:id/react`, `None` снимает реакцию.
    async fn react(&self, id: &str, kind: Option<ReactionKind>)
    -> Result<PartialPost, Self::Error>;

    /// `POST /posts/:id/comment`
    async fn comment(&self, id: &str, text: &str) -> Result<PartialPost, Self::Error>;
}

/// Внешний хостинг картинок.
#[async_trait(?Send)]
pub trait ImageHost {
    /// Представление файла на конкретной платформе.
    type Image;
    /// Ошибка загрузки.
    type Error: std::error::Error + 'static;

    /// Загружает картинку и возвращает её публичный `secure_url`.
    async fn upload(&self, image: Self::Image) -> Result<String, Self::Error>;
}
