//! Операции над одним постом: реакция, комментарий, редактирование, удаление
//! и создание.
//!
//! Успешные ответы `react`/`comment`/`edit` проходят через [`reconcile`] до
//! того, как вызывающий положит результат в какой-либо store. Локальное
//! состояние заранее не меняется, поэтому при ошибке откатывать нечего.

use tracing::debug;

use crate::api::{BlogApi, ImageHost};
use crate::error::ActionError;
use crate::model::{Post, ReactionKind};
use crate::reaction::toggle;
use crate::reconcile::reconcile;
use crate::validation::{PostDraft, validate_comment};

/// Текст подтверждения удаления.
pub const DELETE_PROMPT: &str = "Delete this post?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Результат попытки удаления.
pub enum DeleteOutcome {
    /// Пост удалён на сервере.
    Deleted,
    /// Пользователь не подтвердил удаление, запрос не отправлялся.
    Cancelled,
}

/// Ставит, меняет или снимает реакцию текущего пользователя.
///
/// Текущая реакция берётся из списка реакций поста. Если пользователь
/// неизвестен, запрос всегда ставит `requested`.
pub async fn react<A>(
    api: &A,
    post: &Post,
    current_user: Option<&str>,
    requested: ReactionKind,
) -> Result<Post, ActionError<A::Error>>
where
    A: BlogApi + ?Sized,
{
    let current = current_user.and_then(|user| post.reaction_of(user));
    let next = toggle(current, requested);
    debug!(post_id = %post.id, ?current, ?next, "sending reaction");

    let response = api.react(&post.id, next).await.map_err(ActionError::Api)?;
    Ok(reconcile(post, response))
}

/// Добавляет комментарий. Пустой текст отклоняется без запроса.
pub async fn comment<A>(api: &A, post: &Post, text: &str) -> Result<Post, ActionError<A::Error>>
where
    A: BlogApi + ?Sized,
{
    validate_comment(text).map_err(ActionError::Validation)?;
    debug!(post_id = %post.id, "sending comment");

    let response = api
        .comment(&post.id, text)
        .await
        .map_err(ActionError::Api)?;
    Ok(reconcile(post, response))
}

/// Полностью заменяет заголовок и текст поста.
pub async fn edit<A>(api: &A, post: &Post, draft: PostDraft) -> Result<Post, ActionError<A::Error>>
where
    A: BlogApi + ?Sized,
{
    let draft = draft.validate().map_err(ActionError::Validation)?;
    debug!(post_id = %post.id, "updating post");

    let response = api
        .update_post(&post.id, &draft)
        .await
        .map_err(ActionError::Api)?;
    Ok(reconcile(post, response))
}

/// Удаляет пост после явного подтверждения.
///
/// `confirm` получает [`DELETE_PROMPT`]; при отказе запрос не отправляется.
pub async fn delete<A, F>(
    api: &A,
    post_id: &str,
    confirm: F,
) -> Result<DeleteOutcome, ActionError<A::Error>>
where
    A: BlogApi + ?Sized,
    F: FnOnce(&str) -> bool,
{
    if !confirm(DELETE_PROMPT) {
        debug!(post_id, "delete cancelled by user");
        return Ok(DeleteOutcome::Cancelled);
    }

    api.delete_post(post_id).await.map_err(ActionError::Api)?;
    debug!(post_id, "post deleted");
    Ok(DeleteOutcome::Deleted)
}

/// Создаёт пост без картинки.
pub async fn create<A>(api: &A, draft: PostDraft) -> Result<Post, ActionError<A::Error>>
where
    A: BlogApi + ?Sized,
{
    let draft = draft.validate().map_err(ActionError::Validation)?;
    api.create_post(&draft, None)
        .await
        .map_err(ActionError::Api)
}

/// Создаёт пост с картинкой.
///
/// Картинка загружается на хостинг до создания поста; если загрузка не
/// удалась, пост не создаётся.
pub async fn create_with_image<A, H>(
    api: &A,
    host: &H,
    draft: PostDraft,
    image: H::Image,
) -> Result<Post, ActionError<A::Error>>
where
    A: BlogApi + ?Sized,
    H: ImageHost<Error = A::Error> + ?Sized,
{
    let draft = draft.validate().map_err(ActionError::Validation)?;

    let image_url = host.upload(image).await.map_err(ActionError::Upload)?;
    debug!(%image_url, "image uploaded");

    api.create_post(&draft, Some(&image_url))
        .await
        .map_err(ActionError::Api)
}
