use std::fmt::Display;

use tracing::{debug, warn};

use crate::api::BlogApi;
use crate::model::Post;

/// На сколько постов расширяется лента по «Load more».
pub const REVEAL_STEP: usize = 6;

#[derive(Debug, Clone, PartialEq)]
/// Упорядоченный список постов ленты с поиском и постепенным показом.
pub struct PostListStore {
    posts: Vec<Post>,
    query: String,
    revealed: usize,
}

impl Default for PostListStore {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            query: String::new(),
            revealed: REVEAL_STEP,
        }
    }
}

impl PostListStore {
    /// Пустой список.
    pub fn new() -> Self {
        Self::default()
    }

    /// Список с заданными постами.
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts,
            ..Self::default()
        }
    }

    /// Все посты в порядке хранения.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Пост по идентификатору.
    pub fn find(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    /// Полностью заменяет коллекцию.
    pub fn replace_all(&mut self, posts: Vec<Post>) {
        self.posts = posts;
    }

    /// Применяет результат загрузки ленты.
    ///
    /// При ошибке состояние не меняется, ошибка пишется в лог и возвращается
    /// вызывающему как нефатальная.
    pub fn apply_loaded<E: Display>(&mut self, result: Result<Vec<Post>, E>) -> Result<usize, E> {
        match result {
            Ok(posts) => {
                let count = posts.len();
                self.replace_all(posts);
                debug!(count, "post list loaded");
                Ok(count)
            }
            Err(err) => {
                warn!(error = %err, "failed to load posts, keeping previous list");
                Err(err)
            }
        }
    }

    /// Загружает ленту из удалённого источника.
    pub async fn load<A>(&mut self, api: &A) -> Result<usize, A::Error>
    where
        A: BlogApi + ?Sized,
    {
        let result = api.list_posts().await;
        self.apply_loaded(result)
    }

    /// Заменяет пост с тем же id, сохраняя порядок. Возвращает `false`, если
    /// такого поста нет.
    pub fn apply_update(&mut self, updated: Post) -> bool {
        match self.posts.iter_mut().find(|post| post.id == updated.id) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    /// Удаляет пост с указанным id. Возвращает `false`, если его не было.
    pub fn apply_delete(&mut self, id: &str) -> bool {
        let before = self.posts.len();
        self.posts.retain(|post| post.id != id);
        self.posts.len() != before
    }

    /// Добавляет только что созданный пост в начало ленты.
    pub fn prepend(&mut self, post: Post) {
        self.posts.insert(0, post);
    }

    /// Текущая поисковая строка.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Меняет поисковую строку. Количество показанных постов не уменьшается.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Посты, у которых заголовок содержит `query` без учёта регистра.
    pub fn filter(&self, query: &str) -> Vec<&Post> {
        filter_by_title(&self.posts, query)
    }

    /// Посты, подходящие под текущую поисковую строку.
    pub fn filtered(&self) -> Vec<&Post> {
        self.filter(&self.query)
    }

    /// Сколько отфильтрованных постов сейчас показано.
    pub fn exposed(&self) -> usize {
        self.revealed.min(self.filtered().len())
    }

    /// Показываемая часть отфильтрованной ленты.
    pub fn visible(&self) -> Vec<&Post> {
        let mut filtered = self.filtered();
        filtered.truncate(self.revealed);
        filtered
    }

    /// Есть ли ещё скрытые посты.
    pub fn has_more(&self) -> bool {
        self.revealed < self.filtered().len()
    }

    /// Показывает ещё [`REVEAL_STEP`] постов и возвращает новое количество
    /// показанных. Никогда не превышает размер отфильтрованной ленты.
    pub fn reveal(&mut self) -> usize {
        if self.has_more() {
            self.revealed += REVEAL_STEP;
        }
        self.exposed()
    }
}

/// Поиск без учёта регистра по подстроке заголовка.
pub fn filter_by_title<'a>(posts: &'a [Post], query: &str) -> Vec<&'a Post> {
    let needle = query.to_lowercase();
    posts
        .iter()
        .filter(|post| post.title.to_lowercase().contains(&needle))
        .collect()
}
