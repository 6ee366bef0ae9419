//! Форматирование поста для показа: превью текста и дата публикации.

use std::borrow::Cow;

use chrono::{DateTime, Utc};

/// После скольких символов текст поста сворачивается в карточке.
pub const PREVIEW_CHARS: usize = 120;

/// Превью текста: первые [`PREVIEW_CHARS`] символов и `...`, если текст длиннее
/// и карточка не раскрыта.
pub fn content_preview(content: &str, expanded: bool) -> Cow<'_, str> {
    if expanded || !is_long(content) {
        return Cow::Borrowed(content);
    }
    let cut: String = content.chars().take(PREVIEW_CHARS).collect();
    Cow::Owned(format!("{cut}..."))
}

/// Нужна ли кнопка «See More».
pub fn is_long(content: &str) -> bool {
    content.chars().count() > PREVIEW_CHARS
}

/// Дата публикации вида `Jan 5, 2026, 09:30`.
pub fn display_date(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y, %H:%M").to_string()
}
