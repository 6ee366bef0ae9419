use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder, Response};
use quill_core::{
    BlogApi, ImageHost, LoginForm, PartialPost, Post, PostDraft, ReactionKind, RegistrationForm,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;
use web_sys::{File, FormData};

const API_BASE_URL: &str = match option_env!("QUILL_API_URL") {
    Some(value) => value,
    None => "http://127.0.0.1:5000/api",
};
const UPLOAD_URL: Option<&str> = option_env!("QUILL_UPLOAD_URL");
const UPLOAD_PRESET: Option<&str> = option_env!("QUILL_UPLOAD_PRESET");

#[derive(Debug, Clone)]
pub(crate) enum ApiError {
    Network(String),
    Unauthorized,
    NotFound,
    Rejected(Vec<String>),
    Decode(String),
    Upload(String),
}

impl core::fmt::Display for ApiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::NotFound => write!(f, "not found"),
            Self::Rejected(messages) => write!(f, "request rejected: {}", messages.join("; ")),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
            Self::Upload(msg) => write!(f, "image upload failed: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Сообщения сервера как есть, для всего остального `fallback`.
    pub(crate) fn user_messages(&self, fallback: &str) -> Vec<String> {
        match self {
            Self::Rejected(messages) if !messages.is_empty() => messages.clone(),
            _ => vec![fallback.to_string()],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    msg: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

impl ErrorBody {
    fn into_messages(self) -> Vec<String> {
        let messages: Vec<String> = self.errors.into_iter().map(|item| item.msg).collect();
        if !messages.is_empty() {
            return messages;
        }
        self.message.into_iter().collect()
    }

    // При регистрации главная причина приходит в `message`.
    fn into_register_messages(self) -> Vec<String> {
        self.message
            .or_else(|| self.errors.into_iter().next().map(|item| item.msg))
            .into_iter()
            .collect()
    }
}

type ExtractMessages = fn(ErrorBody) -> Vec<String>;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreatePostRequest<'a> {
    title: &'a str,
    content: &'a str,
    image: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ReactRequest {
    #[serde(rename = "type")]
    kind: Option<ReactionKind>,
}

#[derive(Debug, Serialize)]
struct CommentRequest<'a> {
    text: &'a str,
}

fn endpoint(path: &str) -> String {
    format!(
        "{}/{}",
        API_BASE_URL.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn network(err: gloo_net::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

fn js_error(value: JsValue) -> ApiError {
    ApiError::Upload(format!("{value:?}"))
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

async fn parse_error_body(response: Response, extract: ExtractMessages) -> ApiError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let messages = extract(serde_json::from_str::<ErrorBody>(&text).unwrap_or_default());

    match status {
        401 | 403 => ApiError::Unauthorized,
        404 => ApiError::NotFound,
        _ if messages.is_empty() => ApiError::Rejected(vec![format!("http status {status}")]),
        _ => ApiError::Rejected(messages),
    }
}

async fn check(response: Response) -> Result<Response, ApiError> {
    check_with(response, ErrorBody::into_messages).await
}

async fn check_with(response: Response, extract: ExtractMessages) -> Result<Response, ApiError> {
    if !response.ok() {
        return Err(parse_error_body(response, extract).await);
    }
    Ok(response)
}

pub(crate) async fn register(form: &RegistrationForm) -> Result<(), ApiError> {
    let response = Request::post(&endpoint("/auth/register"))
        .json(form)
        .map_err(network)?
        .send()
        .await
        .map_err(network)?;
    check_with(response, ErrorBody::into_register_messages).await?;
    Ok(())
}

pub(crate) async fn login(form: &LoginForm) -> Result<String, ApiError> {
    let response = Request::post(&endpoint("/auth/login"))
        .json(form)
        .map_err(network)?
        .send()
        .await
        .map_err(network)?;
    let body: LoginResponse = parse_json(check(response).await?).await?;
    Ok(body.token)
}

/// Клиент API для одной операции; токен берётся из сессии в момент создания.
#[derive(Debug, Clone)]
pub(crate) struct Api {
    token: Option<String>,
}

impl Api {
    pub(crate) fn new(token: Option<String>) -> Self {
        Self { token }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.header("Authorization", &format!("Bearer {token}")),
            None => builder,
        }
    }

    fn require_token(&self) -> Result<(), ApiError> {
        if self.token.is_none() {
            return Err(ApiError::Unauthorized);
        }
        Ok(())
    }

    async fn send_json<TReq, TRes>(&self, builder: RequestBuilder, body: &TReq) -> Result<TRes, ApiError>
    where
        TReq: Serialize,
        TRes: DeserializeOwned,
    {
        self.require_token()?;
        let response = self
            .authorized(builder)
            .json(body)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        parse_json(check(response).await?).await
    }
}

#[async_trait(?Send)]
impl BlogApi for Api {
    type Error = ApiError;

    async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
        let response = self
            .authorized(Request::get(&endpoint("/posts")))
            .send()
            .await
            .map_err(network)?;
        parse_json(check(response).await?).await
    }

    async fn get_post(&self, id: &str) -> Result<Post, ApiError> {
        let response = self
            .authorized(Request::get(&endpoint(&format!("/posts/{id}"))))
            .send()
            .await
            .map_err(network)?;
        parse_json(check(response).await?).await
    }

    async fn create_post(&self, draft: &PostDraft, image: Option<&str>) -> Result<Post, ApiError> {
        let payload = CreatePostRequest {
            title: &draft.title,
            content: &draft.content,
            image,
        };
        self.send_json(Request::post(&endpoint("/posts")), &payload)
            .await
    }

    async fn update_post(&self, id: &str, draft: &PostDraft) -> Result<PartialPost, ApiError> {
        self.send_json(Request::put(&endpoint(&format!("/posts/{id}"))), draft)
            .await
    }

    async fn delete_post(&self, id: &str) -> Result<(), ApiError> {
        self.require_token()?;
        let response = self
            .authorized(Request::delete(&endpoint(&format!("/posts/{id}"))))
            .send()
            .await
            .map_err(network)?;
        check(response).await?;
        Ok(())
    }

    async fn react(&self, id: &str, kind: Option<ReactionKind>) -> Result<PartialPost, ApiError> {
        self.send_json(
            Request::post(&endpoint(&format!("/posts/{id}/react"))),
            &ReactRequest { kind },
        )
        .await
    }

    async fn comment(&self, id: &str, text: &str) -> Result<PartialPost, ApiError> {
        self.send_json(
            Request::post(&endpoint(&format!("/posts/{id}/comment"))),
            &CommentRequest { text },
        )
        .await
    }
}

/// Хостинг картинок, настроенный при сборке (`QUILL_UPLOAD_URL`).
#[derive(Debug, Clone, Copy)]
pub(crate) struct UploadHost {
    url: &'static str,
    preset: Option<&'static str>,
}

impl UploadHost {
    pub(crate) fn configured() -> Option<Self> {
        UPLOAD_URL.map(|url| Self {
            url,
            preset: UPLOAD_PRESET,
        })
    }
}

#[async_trait(?Send)]
impl ImageHost for UploadHost {
    type Image = File;
    type Error = ApiError;

    async fn upload(&self, image: File) -> Result<String, ApiError> {
        let form = FormData::new().map_err(js_error)?;
        form.append_with_blob("file", &image).map_err(js_error)?;
        if let Some(preset) = self.preset {
            form.append_with_str("upload_preset", preset)
                .map_err(js_error)?;
        }

        let response = Request::post(self.url)
            .body(form)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        let body: UploadResponse = parse_json(check(response).await?).await?;
        body.secure_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ApiError::Upload("image host returned no secure_url".to_string()))
    }
}
