use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

/// Подпись, которую показываем вместо неизвестного автора.
pub const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Публичные данные пользователя, которые сервер подставляет в пост.
pub struct Author {
    /// Идентификатор пользователя.
    #[serde(rename = "_id")]
    pub id: String,
    /// Отображаемое имя.
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Тип реакции на пост.
pub enum ReactionKind {
    /// 👍
    Like,
    /// ❤
    Love,
    /// 😂
    Laugh,
}

impl ReactionKind {
    /// Все варианты в порядке отображения.
    pub const ALL: [ReactionKind; 3] = [Self::Like, Self::Love, Self::Laugh];

    /// Значение поля `type` на проводе.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Love => "love",
            Self::Laugh => "laugh",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionKind {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "like" => Ok(Self::Like),
            "love" => Ok(Self::Love),
            "laugh" => Ok(Self::Laugh),
            other => Err(CoreError::UnknownReaction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Реакция одного пользователя на пост.
pub struct Reaction {
    /// Идентификатор пользователя, поставившего реакцию.
    #[serde(deserialize_with = "user_id")]
    pub user: String,
    /// Тип реакции.
    #[serde(rename = "type")]
    pub kind: ReactionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Комментарий к посту.
pub struct Comment {
    /// Текст комментария.
    pub text: String,
    /// Автор комментария, если сервер его раскрыл.
    #[serde(default, deserialize_with = "populated_user")]
    pub user: Option<Author>,
}

impl Comment {
    /// Имя автора или [`ANONYMOUS`].
    pub fn author_name(&self) -> &str {
        self.user
            .as_ref()
            .map(|user| user.name.as_str())
            .unwrap_or(ANONYMOUS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Пост в том виде, в котором его хранит клиент.
pub struct Post {
    /// Идентификатор поста.
    #[serde(rename = "_id")]
    pub id: String,
    /// Заголовок.
    pub title: String,
    /// Текст поста.
    pub content: String,
    /// URL картинки на внешнем хостинге.
    #[serde(default)]
    pub image: Option<String>,
    /// Автор. Отсутствует, если сервер прислал только ссылку на пользователя.
    #[serde(default, deserialize_with = "populated_user")]
    pub author: Option<Author>,
    /// Время создания (UTC).
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Реакции в порядке, присланном сервером.
    #[serde(default)]
    pub likes: Vec<Reaction>,
    /// Комментарии в порядке добавления.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Post {
    /// Количество реакций. Считается только по ответу сервера.
    pub fn reaction_count(&self) -> usize {
        self.likes.len()
    }

    /// Реакция указанного пользователя, если она есть.
    pub fn reaction_of(&self, user_id: &str) -> Option<ReactionKind> {
        self.likes
            .iter()
            .find(|reaction| reaction.user == user_id)
            .map(|reaction| reaction.kind)
    }

    /// Является ли пользователь автором поста.
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author
            .as_ref()
            .is_some_and(|author| author.id == user_id)
    }

    /// Имя автора или [`ANONYMOUS`].
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .map(|author| author.name.as_str())
            .unwrap_or(ANONYMOUS)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
/// Ответ мутирующих эндпоинтов (`react`, `comment`, `PUT`).
///
/// Автор здесь сознательно не читается: сервер не раскрывает его в этих
/// ответах, поэтому он берётся из предыдущей версии поста (см. [`crate::reconcile`]).
pub struct PartialPost {
    /// Идентификатор поста.
    #[serde(rename = "_id")]
    pub id: String,
    /// Заголовок.
    pub title: String,
    /// Текст поста.
    pub content: String,
    /// URL картинки.
    #[serde(default)]
    pub image: Option<String>,
    /// Время создания (UTC).
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Реакции.
    #[serde(default)]
    pub likes: Vec<Reaction>,
    /// Комментарии.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UserRef {
    Populated(Author),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UserIdRef {
    Id(String),
    Populated {
        #[serde(rename = "_id")]
        id: String,
    },
}

// Объект с `_id` и `name` даёт автора; голый id, null и прочее превращаются в None.
fn populated_user<'de, D>(deserializer: D) -> Result<Option<Author>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<UserRef>::deserialize(deserializer)?;
    Ok(match value {
        Some(UserRef::Populated(author)) => Some(author),
        Some(UserRef::Other(_)) | None => None,
    })
}

fn user_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match UserIdRef::deserialize(deserializer)? {
        UserIdRef::Id(id) | UserIdRef::Populated { id } => id,
    })
}
