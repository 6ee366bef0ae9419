use std::time::Duration;

use quill_core::{LoginForm, PartialPost, Post, PostDraft, ReactionKind, RegistrationForm};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::settings::ClientSettings;

#[derive(Debug, Serialize)]
struct CreatePostRequestDto<'a> {
    title: &'a str,
    content: &'a str,
    image: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct UpdatePostRequestDto<'a> {
    title: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ReactRequestDto {
    #[serde(rename = "type")]
    kind: Option<ReactionKind>,
}

#[derive(Debug, Serialize)]
struct CommentRequestDto<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorItemDto {
    msg: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponseDto {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorItemDto>,
}

impl ErrorResponseDto {
    fn into_messages(self) -> Vec<String> {
        let messages: Vec<String> = self.errors.into_iter().map(|item| item.msg).collect();
        if !messages.is_empty() {
            return messages;
        }
        self.message.into_iter().collect()
    }

    // При регистрации сервер кладёт главную причину в `message`.
    fn into_register_messages(self) -> Vec<String> {
        self.message
            .or_else(|| self.errors.into_iter().next().map(|item| item.msg))
            .into_iter()
            .collect()
    }
}

type ExtractMessages = fn(ErrorResponseDto) -> Vec<String>;

#[derive(Debug, Deserialize)]
struct LoginResponseDto {
    token: String,
}

#[derive(Debug, Clone)]
/// HTTP-клиент для REST API блог-платформы.
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт HTTP-клиент с базовым URL API и таймаутами из настроек.
    pub fn new(settings: &ClientSettings) -> ClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: settings.api_url.clone(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = self.endpoint(path);
        debug!(%method, %url, authorized = token.is_some(), "api request");

        let request = self.client.request(method, url);
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn decode_error(response: reqwest::Response, extract: ExtractMessages) -> ClientError {
        let status = response.status();
        let body = response
            .json::<ErrorResponseDto>()
            .await
            .unwrap_or_default();
        ClientError::from_http_status(status, extract(body))
    }

    async fn send(request: RequestBuilder) -> ClientResult<reqwest::Response> {
        Self::send_with(request, ErrorResponseDto::into_messages).await
    }

    async fn send_with(
        request: RequestBuilder,
        extract: ExtractMessages,
    ) -> ClientResult<reqwest::Response> {
        let response = request.send().await.map_err(ClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response, extract).await);
        }
        Ok(response)
    }

    /// универсальный helper для запросов с json-ответом
    async fn fetch_json<TRes>(request: RequestBuilder) -> ClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        Self::send(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(ClientError::from_reqwest)
    }

    async fn send_json<TReq, TRes>(
        &self,
        method: Method,
        path: &str,
        body: &TReq,
        token: Option<&str>,
    ) -> ClientResult<TRes>
    where
        TReq: Serialize + ?Sized,
        TRes: DeserializeOwned,
    {
        Self::fetch_json(self.request(method, path, token).json(body)).await
    }

    /// Регистрирует пользователя. Тело успешного ответа не используется.
    pub async fn register(&self, form: &RegistrationForm) -> ClientResult<()> {
        let request = self
            .request(Method::POST, "/auth/register", None)
            .json(form);
        Self::send_with(request, ErrorResponseDto::into_register_messages).await?;
        Ok(())
    }

    /// Выполняет вход и возвращает токен сессии.
    pub async fn login(&self, form: &LoginForm) -> ClientResult<String> {
        let dto: LoginResponseDto = self
            .send_json(Method::POST, "/auth/login", form, None)
            .await?;
        Ok(dto.token)
    }

    /// Возвращает все посты ленты.
    pub async fn list_posts(&self, token: Option<&str>) -> ClientResult<Vec<Post>> {
        Self::fetch_json(self.request(Method::GET, "/posts", token)).await
    }

    /// Получает пост по идентификатору.
    pub async fn get_post(&self, token: Option<&str>, id: &str) -> ClientResult<Post> {
        Self::fetch_json(self.request(Method::GET, &format!("/posts/{id}"), token)).await
    }

    /// Создаёт пост. `image` — уже загруженный на хостинг URL.
    pub async fn create_post(
        &self,
        token: &str,
        draft: &PostDraft,
        image: Option<&str>,
    ) -> ClientResult<Post> {
        let payload = CreatePostRequestDto {
            title: &draft.title,
            content: &draft.content,
            image,
        };
        self.send_json(Method::POST, "/posts", &payload, Some(token))
            .await
    }

    /// Полностью заменяет заголовок и текст поста.
    pub async fn update_post(
        &self,
        token: &str,
        id: &str,
        draft: &PostDraft,
    ) -> ClientResult<PartialPost> {
        let payload = UpdatePostRequestDto {
            title: &draft.title,
            content: &draft.content,
        };
        self.send_json(Method::PUT, &format!("/posts/{id}"), &payload, Some(token))
            .await
    }

    /// Удаляет пост по идентификатору.
    pub async fn delete_post(&self, token: &str, id: &str) -> ClientResult<()> {
        Self::send(self.request(Method::DELETE, &format!("/posts/{id}"), Some(token))).await?;
        Ok(())
    }

    /// Ставит реакцию; `None` отправляется как `{"type": null}` и снимает её.
    pub async fn react(
        &self,
        token: &str,
        id: &str,
        kind: Option<ReactionKind>,
    ) -> ClientResult<PartialPost> {
        let payload = ReactRequestDto { kind };
        self.send_json(
            Method::POST,
            &format!("/posts/{id}/react"),
            &payload,
            Some(token),
        )
        .await
    }

    /// Добавляет комментарий.
    pub async fn comment(&self, token: &str, id: &str, text: &str) -> ClientResult<PartialPost> {
        let payload = CommentRequestDto { text };
        self.send_json(
            Method::POST,
            &format!("/posts/{id}/comment"),
            &payload,
            Some(token),
        )
        .await
    }
}
