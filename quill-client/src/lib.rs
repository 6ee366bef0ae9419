//! Нативный клиент REST API блог-платформы.
//!
//! Предоставляет [`BlogClient`] поверх `reqwest`. Клиент хранит токен сессии
//! после `login` и автоматически использует его в защищённых операциях.
//! Операции над постами идут через [`quill_core::BlogApi`], поэтому
//! react/comment/edit/delete из [`quill_core::actions`] работают с ним напрямую.
#![warn(missing_docs)]

mod error;
mod http_client;
mod settings;
mod upload;

pub use error::{ClientError, ClientResult};
pub use http_client::HttpClient;
pub use settings::{ClientSettings, DEFAULT_API_URL};
pub use upload::{ImageFile, ImageUploader};

use async_trait::async_trait;
use quill_core::{
    BlogApi, LoginForm, PartialPost, Post, PostDraft, ReactionKind, RegistrationForm,
};

#[derive(Debug, Clone)]
/// Клиент API с сохранённым токеном сессии.
pub struct BlogClient {
    http_client: HttpClient,
    token: Option<String>,
}

impl BlogClient {
    /// Создаёт клиент по настройкам.
    pub fn new(settings: &ClientSettings) -> ClientResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(settings)?,
            token: None,
        })
    }

    /// Устанавливает токен вручную (например, прочитанный из хранилища).
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Возвращает текущий токен, если он установлен.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Очищает сохранённый токен.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Регистрирует пользователя.
    ///
    /// Форма проверяется до запроса; при ошибках проверки запрос не отправляется.
    pub async fn register(&self, form: RegistrationForm) -> ClientResult<()> {
        let form = form.validate().map_err(ClientError::Validation)?;
        self.http_client.register(&form).await
    }

    /// Выполняет вход и сохраняет полученный токен в клиенте.
    pub async fn login(&mut self, form: LoginForm) -> ClientResult<String> {
        let form = form.validate().map_err(ClientError::Validation)?;
        let token = self.http_client.login(&form).await?;
        self.token = Some(token.clone());
        Ok(token)
    }

    fn require_token(&self) -> ClientResult<&str> {
        self.token.as_deref().ok_or(ClientError::Unauthorized)
    }
}

#[async_trait(?Send)]
impl BlogApi for BlogClient {
    type Error = ClientError;

    async fn list_posts(&self) -> ClientResult<Vec<Post>> {
        self.http_client.list_posts(self.get_token()).await
    }

    async fn get_post(&self, id: &str) -> ClientResult<Post> {
        self.http_client.get_post(self.get_token(), id).await
    }

    async fn create_post(&self, draft: &PostDraft, image: Option<&str>) -> ClientResult<Post> {
        let token = self.require_token()?;
        self.http_client.create_post(token, draft, image).await
    }

    async fn update_post(&self, id: &str, draft: &PostDraft) -> ClientResult<PartialPost> {
        let token = self.require_token()?;
        self.http_client.update_post(token, id, draft).await
    }

    async fn delete_post(&self, id: &str) -> ClientResult<()> {
        let token = self.require_token()?;
        self.http_client.delete_post(token, id).await
    }

    async fn react(&self, id: &str, kind: Option<ReactionKind>) -> ClientResult<PartialPost> {
        let token = self.require_token()?;
        self.http_client.react(token, id, kind).await
    }

    async fn comment(&self, id: &str, text: &str) -> ClientResult<PartialPost> {
        let token = self.require_token()?;
        self.http_client.comment(token, id, text).await
    }
}
