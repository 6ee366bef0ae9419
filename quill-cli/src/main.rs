mod logging;
mod storage;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use quill_client::{BlogClient, ClientError, ClientSettings, ImageFile, ImageUploader};
use quill_core::actions::{self, DeleteOutcome};
use quill_core::format::{content_preview, display_date};
use quill_core::{
    ActionError, BlogApi, LoginForm, Post, PostDraft, PostListStore, ReactionKind,
    RegistrationForm, Route, SessionError, SessionGuard, Theme,
};
use tracing::debug;

use crate::logging::init_logging;
use crate::storage::{DEFAULT_STATE_DIR, FileStore};

const FALLBACK_MESSAGE: &str = "Something went wrong";
const LOGIN_FALLBACK_MESSAGE: &str = "Invalid credentials";

#[derive(Debug, Parser)]
#[command(name = "quill", version, about = "CLI клиент блог-платформы")]
struct Cli {
    /// Базовый URL API (по умолчанию QUILL_API_URL или http://127.0.0.1:5000/api).
    #[arg(long, global = true)]
    server: Option<String>,

    /// Каталог, где хранятся токен и тема.
    #[arg(long, global = true, default_value = DEFAULT_STATE_DIR)]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Вход пользователя; токен сохраняется в каталоге состояния.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Выход: токен удаляется.
    Logout,
    /// Состояние сессии.
    Status,
    /// Лента постов (требует входа).
    List {
        /// Фильтр по заголовку без учёта регистра.
        #[arg(long)]
        search: Option<String>,
        /// Сколько раз нажать «Load more».
        #[arg(long, default_value_t = 0)]
        more: usize,
    },
    /// Пост целиком, с комментариями (требует входа).
    Show {
        #[arg(long)]
        id: String,
    },
    /// Создание поста (требует входа).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Картинка, загружаемая на хостинг до создания поста.
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Редактирование: заголовок и текст заменяются целиком.
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    /// Удаление поста; без --yes спрашивает подтверждение.
    Delete {
        #[arg(long)]
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Реакция like|love|laugh; повторная такая же реакция снимает её.
    React {
        #[arg(long)]
        id: String,
        #[arg(long)]
        kind: ReactionKind,
    },
    /// Комментарий к посту.
    Comment {
        #[arg(long)]
        id: String,
        #[arg(long)]
        text: String,
    },
    /// Показать тему или переключить её.
    Theme {
        #[arg(long)]
        toggle: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut settings = ClientSettings::from_env().context("некорректные настройки окружения")?;
    init_logging(&settings.log_level)?;
    if let Some(server) = cli.server {
        settings = settings.with_api_url(normalize_server(server));
    }
    debug!(api_url = %settings.api_url, state_dir = %cli.state_dir.display(), "starting");

    let store = FileStore::new(cli.state_dir);
    let mut session = SessionGuard::new(&store);
    let mut client = BlogClient::new(&settings).map_err(|err| map_client_error(err, FALLBACK_MESSAGE))?;
    if let Some(token) = session.token() {
        client.set_token(token);
    }

    match cli.command {
        Command::Register {
            name,
            email,
            password,
        } => {
            client
                .register(RegistrationForm {
                    name,
                    email,
                    password,
                })
                .await
                .map_err(|err| map_client_error(err, FALLBACK_MESSAGE))?;
            println!("Регистрация успешна, теперь выполните `quill login ...`");
        }
        Command::Login { email, password } => {
            let token = client
                .login(LoginForm { email, password })
                .await
                .map_err(|err| map_client_error(err, LOGIN_FALLBACK_MESSAGE))?;
            session
                .sign_in(&token)
                .context("не удалось сохранить токен")?;
            println!("Вход выполнен");
        }
        Command::Logout => {
            session.sign_out().context("не удалось удалить токен")?;
            println!("Выход выполнен");
        }
        Command::Status => print_status(&session),
        Command::List { search, more } => {
            require_route(&session, Route::Dashboard)?;
            let mut posts = PostListStore::new();
            posts
                .load(&client)
                .await
                .map_err(|err| map_client_error(err, FALLBACK_MESSAGE))?;
            if let Some(search) = search {
                posts.set_query(search);
            }
            for _ in 0..more {
                posts.reveal();
            }
            print_list(&posts, current_user(&session).as_deref());
        }
        Command::Show { id } => {
            require_route(&session, Route::PostDetail(id.clone()))?;
            let post = client
                .get_post(&id)
                .await
                .map_err(|err| map_client_error(err, FALLBACK_MESSAGE))?;
            print_post("Пост", &post, current_user(&session).as_deref());
        }
        Command::Create {
            title,
            content,
            image,
        } => {
            require_route(&session, Route::Create)?;
            let draft = PostDraft::new(title, content);
            let post = match image {
                Some(path) => {
                    let uploader = ImageUploader::from_settings(&settings)
                        .map_err(|err| map_client_error(err, FALLBACK_MESSAGE))?
                        .context("QUILL_UPLOAD_URL не задан, загрузка картинок недоступна")?;
                    let image = ImageFile::from_path(&path)
                        .await
                        .with_context(|| format!("не удалось прочитать {}", path.display()))?;
                    actions::create_with_image(&client, &uploader, draft, image).await
                }
                None => actions::create(&client, draft).await,
            }
            .map_err(map_action_error)?;
            print_post("Пост создан", &post, current_user(&session).as_deref());
        }
        Command::Edit { id, title, content } => {
            require_route(&session, Route::PostDetail(id.clone()))?;
            let post = fetch_owned(&client, &session, &id).await?;
            let post = actions::edit(&client, &post, PostDraft::new(title, content))
                .await
                .map_err(map_action_error)?;
            print_post("Пост обновлён", &post, current_user(&session).as_deref());
        }
        Command::Delete { id, yes } => {
            require_route(&session, Route::PostDetail(id.clone()))?;
            fetch_owned(&client, &session, &id).await?;
            let outcome = actions::delete(&client, &id, |prompt| yes || confirm_on_stdin(prompt))
                .await
                .map_err(map_action_error)?;
            match outcome {
                DeleteOutcome::Deleted => println!("Пост удалён: id={id}"),
                DeleteOutcome::Cancelled => println!("Удаление отменено"),
            }
        }
        Command::React { id, kind } => {
            require_route(&session, Route::PostDetail(id.clone()))?;
            let post = client
                .get_post(&id)
                .await
                .map_err(|err| map_client_error(err, FALLBACK_MESSAGE))?;
            let me = current_user(&session);
            let post = actions::react(&client, &post, me.as_deref(), kind)
                .await
                .map_err(map_action_error)?;
            print_post("Реакция обновлена", &post, me.as_deref());
        }
        Command::Comment { id, text } => {
            require_route(&session, Route::PostDetail(id.clone()))?;
            let post = client
                .get_post(&id)
                .await
                .map_err(|err| map_client_error(err, FALLBACK_MESSAGE))?;
            let post = actions::comment(&client, &post, &text)
                .await
                .map_err(map_action_error)?;
            print_post("Комментарий добавлен", &post, current_user(&session).as_deref());
        }
        Command::Theme { toggle } => {
            let mut theme = Theme::load(&store);
            if toggle {
                theme = theme.toggled();
                theme.save(&store).context("не удалось сохранить тему")?;
            }
            println!("Тема: {theme}");
        }
    }

    Ok(())
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

/// Защищённые команды требуют входа, как и соответствующие экраны.
fn require_route(session: &SessionGuard<&FileStore>, route: Route) -> Result<()> {
    let target = session.resolve(route.clone());
    if target != route {
        bail!(
            "требуется авторизация для {}: выполните `quill login ...`",
            route.path()
        );
    }
    Ok(())
}

fn current_user(session: &SessionGuard<&FileStore>) -> Option<String> {
    session.current_user_id().ok()
}

/// Редактировать и удалять можно только свои посты.
async fn fetch_owned(
    client: &BlogClient,
    session: &SessionGuard<&FileStore>,
    id: &str,
) -> Result<Post> {
    let post = client
        .get_post(id)
        .await
        .map_err(|err| map_client_error(err, FALLBACK_MESSAGE))?;
    let me = session
        .current_user_id()
        .context("не удалось определить текущего пользователя")?;
    if !post.is_authored_by(&me) {
        bail!("пост {id} принадлежит другому пользователю");
    }
    Ok(post)
}

fn confirm_on_stdin(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_confirmation(&answer),
        Err(_) => false,
    }
}

fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "д" | "да")
}

fn map_client_error(err: ClientError, fallback: &str) -> anyhow::Error {
    match err {
        ClientError::Unauthorized => anyhow!(
            "требуется авторизация: выполните `quill login ...` или `quill register ...`"
        ),
        ClientError::NotFound => anyhow!("ресурс не найден"),
        ClientError::Validation(errors) => anyhow!("некорректные данные: {errors}"),
        ClientError::Http(err) => {
            debug!(error = %err, "transport error");
            anyhow!("ошибка HTTP: {err}")
        }
        other => {
            debug!(error = %other, "request failed");
            anyhow!(other.user_messages(fallback).join("\n"))
        }
    }
}

fn map_action_error(err: ActionError<ClientError>) -> anyhow::Error {
    map_client_error(err.into(), FALLBACK_MESSAGE)
}

fn print_status(session: &SessionGuard<&FileStore>) {
    if !session.is_authenticated() {
        println!("Не выполнен вход");
        return;
    }
    match session.current_user_id() {
        Ok(user_id) => println!("Вход выполнен, user_id: {user_id}"),
        Err(SessionError::MalformedToken(reason)) => {
            println!("Вход выполнен, но токен не читается: {reason}")
        }
        Err(err) => println!("Вход выполнен, user_id неизвестен: {err}"),
    }
}

fn reaction_line(post: &Post, current_user: Option<&str>) -> String {
    let mine = current_user
        .and_then(|user| post.reaction_of(user))
        .map(|kind| format!(", ваша: {kind}"))
        .unwrap_or_default();
    format!("реакций: {}{mine}", post.reaction_count())
}

fn print_post(title: &str, post: &Post, current_user: Option<&str>) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    println!("author: {}", post.author_name());
    if let Some(created_at) = &post.created_at {
        println!("created_at: {}", display_date(created_at));
    }
    if let Some(image) = &post.image {
        println!("image: {image}");
    }
    println!("content: {}", post.content);
    println!("{}", reaction_line(post, current_user));
    println!("Комментарии: {}", post.comments.len());
    for comment in &post.comments {
        println!("  {}: {}", comment.author_name(), comment.text);
    }
}

fn print_list(posts: &PostListStore, current_user: Option<&str>) {
    let visible = posts.visible();
    println!(
        "Постов: {} из {} (фильтр: \"{}\")",
        visible.len(),
        posts.filtered().len(),
        posts.query()
    );

    for post in visible {
        let own = current_user.is_some_and(|user| post.is_authored_by(user));
        println!(
            "- [{}] {} ({}{}) {}",
            post.id,
            post.title,
            post.author_name(),
            if own { ", ваш" } else { "" },
            reaction_line(post, current_user)
        );
        println!("    {}", content_preview(&post.content, false));
    }

    if posts.has_more() {
        println!("Есть ещё посты: используйте --more");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::MemoryStore;

    #[test]
    fn normalize_server_keeps_scheme() {
        let s = normalize_server("https://example.com/api".to_string());
        assert_eq!(s, "https://example.com/api");
    }

    #[test]
    fn normalize_server_adds_http_scheme() {
        let s = normalize_server("127.0.0.1:5000/api".to_string());
        assert_eq!(s, "http://127.0.0.1:5000/api");
    }

    #[test]
    fn cli_parses_reaction_kind() {
        let cli = Cli::try_parse_from(["quill", "react", "--id", "p1", "--kind", "love"])
            .expect("valid arguments");
        match cli.command {
            Command::React { id, kind } => {
                assert_eq!(id, "p1");
                assert_eq!(kind, ReactionKind::Love);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.state_dir, PathBuf::from(DEFAULT_STATE_DIR));
    }

    #[test]
    fn cli_rejects_unknown_reaction() {
        let parsed = Cli::try_parse_from(["quill", "react", "--id", "p1", "--kind", "wow"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn confirmation_accepts_yes_only() {
        assert!(is_confirmation("y\n"));
        assert!(is_confirmation(" Yes "));
        assert!(is_confirmation("да"));
        assert!(!is_confirmation(""));
        assert!(!is_confirmation("n"));
    }

    #[test]
    fn validation_errors_are_listed() {
        let errors = RegistrationForm {
            name: "bob".to_string(),
            email: "a@b.com".to_string(),
            password: "abcde".to_string(),
        }
        .validate()
        .expect_err("invalid form");
        let message = map_client_error(ClientError::Validation(errors), FALLBACK_MESSAGE).to_string();
        assert!(message.contains("name: First letter must be uppercase"));
        assert!(message.contains("password: Password must contain an uppercase letter"));
    }

    #[test]
    fn rejected_without_messages_uses_fallback() {
        let message =
            map_client_error(ClientError::Rejected(Vec::new()), LOGIN_FALLBACK_MESSAGE).to_string();
        assert_eq!(message, "Invalid credentials");
    }

    #[test]
    fn reaction_line_marks_own_reaction() {
        let post: Post = sample_post();
        assert_eq!(reaction_line(&post, Some("u1")), "реакций: 1, ваша: laugh");
        assert_eq!(reaction_line(&post, None), "реакций: 1");
    }

    #[test]
    fn guard_rejects_protected_commands_when_signed_out() {
        let storage = MemoryStore::new();
        let session = SessionGuard::new(&storage);
        assert_eq!(session.resolve(Route::Create), Route::Login);
    }

    fn sample_post() -> Post {
        Post {
            id: "p1".to_string(),
            title: "t".to_string(),
            content: "c".to_string(),
            image: None,
            author: None,
            created_at: None,
            likes: vec![quill_core::Reaction {
                user: "u1".to_string(),
                kind: ReactionKind::Laugh,
            }],
            comments: Vec::new(),
        }
    }
}
