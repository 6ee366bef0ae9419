//! Платформенно-независимая часть клиента блог-платформы.
//!
//! Здесь живёт всё, что одинаково для CLI и браузерного приложения:
//! - модель поста и правила разбора ответов API;
//! - проверка форм регистрации, входа, поста и комментария;
//! - слияние ответов сервера с известной версией поста ([`reconcile`]);
//! - список постов ленты с поиском и «Load more» ([`PostListStore`]);
//! - операции react/comment/edit/delete/create поверх абстрактного [`BlogApi`];
//! - явное состояние сессии ([`SessionGuard`]), маршруты и тема.
#![warn(missing_docs)]

pub mod actions;
mod api;
mod error;
pub mod format;
mod model;
mod reaction;
mod reconcile;
mod route;
mod session;
mod store;
mod theme;
pub mod validation;

pub use api::{BlogApi, ImageHost};
pub use error::{ActionError, CoreError, SessionError, StorageError};
pub use model::{ANONYMOUS, Author, Comment, PartialPost, Post, Reaction, ReactionKind};
pub use reaction::toggle;
pub use reconcile::reconcile;
pub use route::Route;
pub use session::{
    KeyValueStore, MemoryStore, SessionGuard, SubscriptionId, TOKEN_KEY, user_id_from_token,
};
pub use store::{PostListStore, REVEAL_STEP, filter_by_title};
pub use theme::{THEME_KEY, Theme};
pub use validation::{
    Field, LoginForm, PostDraft, RegistrationForm, ValidationErrors, validate_registration,
};
