use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};

use quill_client::{BlogClient, ClientError, ClientSettings, ImageFile, ImageUploader};
use quill_core::actions::{self, DeleteOutcome};
use quill_core::{
    BlogApi, Field, LoginForm, PostDraft, PostListStore, ReactionKind, RegistrationForm,
};

const TOKEN: &str = "header.payload.signature";
const ME: &str = "u-me";

#[derive(Debug, Clone)]
struct Recorded {
    route: String,
    authorization: Option<String>,
    content_type: Option<String>,
    body: Value,
}

type Shared = Arc<Mutex<Vec<Recorded>>>;

fn record(state: &Shared, route: String, headers: &HeaderMap, body: &Bytes) -> Recorded {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let entry = Recorded {
        route,
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body: serde_json::from_slice(body).unwrap_or(Value::Null),
    };
    state.lock().expect("lock").push(entry.clone());
    entry
}

fn authorized(entry: &Recorded) -> bool {
    entry.authorization.as_deref() == Some(format!("Bearer {TOKEN}").as_str())
}

fn stored_post() -> Value {
    json!({
        "_id": "p1",
        "title": "First post",
        "content": "Hello",
        "image": null,
        "author": {"_id": "u-author", "name": "Alice"},
        "createdAt": "2026-01-05T09:30:00Z",
        "likes": [],
        "comments": []
    })
}

// Мутирующие эндпоинты отвечают без раскрытого автора.
fn partial(id: &str, likes: Value, comments: Value, title: &str, content: &str) -> Value {
    json!({
        "_id": id,
        "title": title,
        "content": content,
        "author": "u-author",
        "likes": likes,
        "comments": comments
    })
}

async fn register(State(state): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    let entry = record(&state, "POST /auth/register".to_string(), &headers, &body);
    if entry.body["name"] == "Taken" {
        return (
            StatusCode::CONFLICT,
            axum::Json(json!({
                "message": "User already exists",
                "errors": [{"msg": "Email is already registered"}]
            })),
        )
            .into_response();
    }
    axum::Json(json!({"message": "registered"})).into_response()
}

async fn login(State(state): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    let entry = record(&state, "POST /auth/login".to_string(), &headers, &body);
    if entry.body["password"] == "Secret1" {
        return axum::Json(json!({ "token": TOKEN })).into_response();
    }
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({"errors": [{"msg": "Invalid credentials"}]})),
    )
        .into_response()
}

async fn list_posts(State(state): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    record(&state, "GET /posts".to_string(), &headers, &body);
    axum::Json(json!([stored_post()])).into_response()
}

async fn create_post(State(state): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    let entry = record(&state, "POST /posts".to_string(), &headers, &body);
    if !authorized(&entry) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    axum::Json(json!({
        "_id": "p2",
        "title": entry.body["title"],
        "content": entry.body["content"],
        "image": entry.body["image"],
        "author": ME,
        "likes": [],
        "comments": []
    }))
    .into_response()
}

async fn get_post(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, format!("GET /posts/{id}"), &headers, &body);
    if id == "p1" {
        return axum::Json(stored_post()).into_response();
    }
    (
        StatusCode::NOT_FOUND,
        axum::Json(json!({"message": "Post not found"})),
    )
        .into_response()
}

async fn update_post(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let entry = record(&state, format!("PUT /posts/{id}"), &headers, &body);
    let title = entry.body["title"].as_str().unwrap_or_default().to_string();
    let content = entry.body["content"].as_str().unwrap_or_default().to_string();
    axum::Json(partial(&id, json!([]), json!([]), &title, &content)).into_response()
}

async fn delete_post(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, format!("DELETE /posts/{id}"), &headers, &body);
    axum::Json(json!({"message": "deleted"})).into_response()
}

async fn react(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let entry = record(&state, format!("POST /posts/{id}/react"), &headers, &body);
    let likes = match &entry.body["type"] {
        Value::Null => json!([]),
        kind => json!([{"user": ME, "type": kind}]),
    };
    axum::Json(partial(&id, likes, json!([]), "First post", "Hello")).into_response()
}

async fn comment(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let entry = record(&state, format!("POST /posts/{id}/comment"), &headers, &body);
    let comments = json!([{"text": entry.body["text"], "user": ME}]);
    axum::Json(partial(&id, json!([]), comments, "First post", "Hello")).into_response()
}

async fn upload(State(state): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    let entry = record(&state, "POST /upload".to_string(), &headers, &body);
    let is_multipart = entry
        .content_type
        .as_deref()
        .is_some_and(|value| value.starts_with("multipart/form-data"));
    if !is_multipart {
        return StatusCode::BAD_REQUEST.into_response();
    }
    axum::Json(json!({"secure_url": "https://img.example/cat.png"})).into_response()
}

async fn spawn_mock() -> (String, Shared) {
    let state = Shared::default();
    let app = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/posts", get(list_posts).post(create_post))
        .route(
            "/api/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/api/posts/{id}/react", post(react))
        .route("/api/posts/{id}/comment", post(comment))
        .route("/upload", post(upload))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("mock server address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server must run");
    });

    (format!("http://{addr}"), state)
}

fn routes(state: &Shared) -> Vec<String> {
    state
        .lock()
        .expect("lock")
        .iter()
        .map(|entry| entry.route.clone())
        .collect()
}

fn bodies(state: &Shared, route: &str) -> Vec<Value> {
    state
        .lock()
        .expect("lock")
        .iter()
        .filter(|entry| entry.route == route)
        .map(|entry| entry.body.clone())
        .collect()
}

async fn signed_in(base: &str) -> BlogClient {
    let mut client = BlogClient::new(&ClientSettings::new(format!("{base}/api")))
        .expect("client should build");
    client
        .login(LoginForm {
            email: "bob@example.com".to_string(),
            password: "Secret1".to_string(),
        })
        .await
        .expect("login must succeed");
    client
}

#[tokio::test]
async fn register_validates_before_sending() {
    let (base, state) = spawn_mock().await;
    let client = BlogClient::new(&ClientSettings::new(format!("{base}/api"))).expect("client");

    let err = client
        .register(RegistrationForm {
            name: "bob".to_string(),
            email: "a@b.com".to_string(),
            password: "Abcde".to_string(),
        })
        .await
        .expect_err("lowercase name must be rejected");

    match err {
        ClientError::Validation(errors) => {
            assert_eq!(errors.get(Field::Name), Some("First letter must be uppercase"));
            assert_eq!(errors.len(), 1);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(routes(&state).is_empty(), "nothing must reach the server");
}

#[tokio::test]
async fn register_surfaces_server_message() {
    let (base, _state) = spawn_mock().await;
    let client = BlogClient::new(&ClientSettings::new(format!("{base}/api"))).expect("client");

    client
        .register(RegistrationForm {
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "Abcde".to_string(),
        })
        .await
        .expect("valid registration must succeed");

    let err = client
        .register(RegistrationForm {
            name: "Taken".to_string(),
            email: "taken@example.com".to_string(),
            password: "Abcde".to_string(),
        })
        .await
        .expect_err("duplicate must be rejected");
    assert_eq!(
        err.user_messages("Something went wrong"),
        vec!["User already exists"]
    );
}

#[tokio::test]
async fn login_stores_token_or_reports_errors() {
    let (base, _state) = spawn_mock().await;
    let mut client = BlogClient::new(&ClientSettings::new(format!("{base}/api"))).expect("client");

    let err = client
        .login(LoginForm {
            email: "bob@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .expect_err("bad credentials must fail");
    assert_eq!(err.user_messages("Invalid credentials"), vec!["Invalid credentials"]);
    assert!(client.get_token().is_none());

    let token = client
        .login(LoginForm {
            email: "bob@example.com".to_string(),
            password: "Secret1".to_string(),
        })
        .await
        .expect("login must succeed");
    assert_eq!(token, TOKEN);
    assert_eq!(client.get_token(), Some(TOKEN));
}

#[tokio::test]
async fn writes_without_token_fail_locally() {
    let (base, state) = spawn_mock().await;
    let client = BlogClient::new(&ClientSettings::new(format!("{base}/api"))).expect("client");

    let err = client
        .react("p1", Some(ReactionKind::Like))
        .await
        .expect_err("react needs a token");
    assert!(matches!(err, ClientError::Unauthorized));
    assert!(routes(&state).is_empty());
}

#[tokio::test]
async fn missing_post_is_not_found() {
    let (base, _state) = spawn_mock().await;
    let client = signed_in(&base).await;

    let err = client.get_post("nope").await.expect_err("must be 404");
    assert!(matches!(err, ClientError::NotFound));

    let found = client.get_post("p1").await.expect("p1 exists");
    assert_eq!(found.author_name(), "Alice");
}

#[tokio::test]
async fn dashboard_flow_keeps_author_through_every_mutation() {
    let (base, state) = spawn_mock().await;
    let client = signed_in(&base).await;

    let mut store = PostListStore::new();
    assert_eq!(store.load(&client).await.expect("load must succeed"), 1);
    let original = store.find("p1").cloned().expect("p1 loaded");

    let liked = actions::react(&client, &original, Some(ME), ReactionKind::Like)
        .await
        .expect("react must succeed");
    assert_eq!(liked.author_name(), "Alice");
    assert_eq!(liked.reaction_of(ME), Some(ReactionKind::Like));
    assert!(store.apply_update(liked.clone()));

    let cleared = actions::react(&client, &liked, Some(ME), ReactionKind::Like)
        .await
        .expect("second react must succeed");
    assert_eq!(cleared.reaction_count(), 0);
    assert!(store.apply_update(cleared.clone()));

    assert_eq!(
        bodies(&state, "POST /posts/p1/react"),
        vec![json!({"type": "like"}), json!({"type": null})]
    );

    let commented = actions::comment(&client, &cleared, "Great read")
        .await
        .expect("comment must succeed");
    assert_eq!(commented.comments[0].text, "Great read");
    assert_eq!(commented.author_name(), "Alice");

    let edited = actions::edit(&client, &commented, PostDraft::new("Edited", "New body"))
        .await
        .expect("edit must succeed");
    assert_eq!(edited.title, "Edited");
    assert_eq!(edited.author_name(), "Alice");
    assert!(store.apply_update(edited));
    assert_eq!(store.posts()[0].title, "Edited");

    let outcome = actions::delete(&client, "p1", |_| true)
        .await
        .expect("delete must succeed");
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert!(store.apply_delete("p1"));
    assert!(store.posts().is_empty());

    let recorded = state.lock().expect("lock").clone();
    assert!(
        recorded
            .iter()
            .filter(|entry| entry.route != "POST /auth/login")
            .all(authorized),
        "every request after login must carry the bearer token"
    );
}

#[tokio::test]
async fn create_uploads_image_before_post() {
    let (base, state) = spawn_mock().await;
    let client = signed_in(&base).await;

    let mut settings = ClientSettings::new(format!("{base}/api"));
    settings.upload_url = Some(format!("{base}/upload"));
    settings.upload_preset = Some("unsigned".to_string());
    let uploader = ImageUploader::from_settings(&settings)
        .expect("settings are valid")
        .expect("upload url is set");

    let image = ImageFile {
        file_name: "cat.png".to_string(),
        bytes: b"not really a png".to_vec(),
    };
    let created = actions::create_with_image(&client, &uploader, PostDraft::new("Cat", "Meow"), image)
        .await
        .expect("create must succeed");

    assert_eq!(created.image.as_deref(), Some("https://img.example/cat.png"));
    assert_eq!(
        routes(&state),
        vec!["POST /auth/login", "POST /upload", "POST /posts"]
    );
    assert_eq!(
        bodies(&state, "POST /posts"),
        vec![json!({"title": "Cat", "content": "Meow", "image": "https://img.example/cat.png"})]
    );
}
