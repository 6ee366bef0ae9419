use crate::model::{PartialPost, Post};

/// Сливает ответ мутирующего эндпоинта с последней известной версией поста.
///
/// Все поля берутся из `response`, кроме `author`: он всегда переносится из
/// `previous`. API не раскрывает автора в ответах на реакцию, комментарий и
/// редактирование, поэтому прямая замена стирала бы его при каждом действии.
pub fn reconcile(previous: &Post, response: PartialPost) -> Post {
    let PartialPost {
        id,
        title,
        content,
        image,
        created_at,
        likes,
        comments,
    } = response;

    Post {
        id,
        title,
        content,
        image,
        author: previous.author.clone(),
        created_at,
        likes,
        comments,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::model::{Author, Comment, Reaction, ReactionKind};

    fn previous() -> Post {
        Post {
            id: "p1".to_string(),
            title: "Old title".to_string(),
            content: "Old content".to_string(),
            image: Some("https://img.example/old.png".to_string()),
            author: Some(Author {
                id: "u1".to_string(),
                name: "Alice".to_string(),
            }),
            created_at: Utc.timestamp_opt(10, 0).single(),
            likes: vec![Reaction {
                user: "u2".to_string(),
                kind: ReactionKind::Like,
            }],
            comments: vec![],
        }
    }

    fn response() -> PartialPost {
        PartialPost {
            id: "p1".to_string(),
            title: "New title".to_string(),
            content: "New content".to_string(),
            image: None,
            created_at: Utc.timestamp_opt(10, 0).single(),
            likes: vec![],
            comments: vec![Comment {
                text: "first".to_string(),
                user: None,
            }],
        }
    }

    #[test]
    fn reconcile_keeps_previous_author() {
        let merged = reconcile(&previous(), response());
        assert_eq!(merged.author, previous().author);
        assert_eq!(merged.author_name(), "Alice");
    }

    #[test]
    fn reconcile_takes_every_other_field_from_response() {
        let merged = reconcile(&previous(), response());
        assert_eq!(merged.title, "New title");
        assert_eq!(merged.content, "New content");
        assert!(merged.image.is_none(), "stale image must not be carried over");
        assert!(merged.likes.is_empty(), "stale reactions must not be carried over");
        assert_eq!(merged.comments.len(), 1);
    }

    #[test]
    fn reconcile_from_server_json_without_author() {
        let raw = r#"{"_id":"p1","title":"t","content":"c","author":"u1","likes":[{"user":"u3","type":"love"}]}"#;
        let partial: PartialPost = serde_json::from_str(raw).expect("partial post should parse");

        let merged = reconcile(&previous(), partial);
        assert_eq!(merged.author, previous().author);
        assert_eq!(merged.reaction_of("u3"), Some(ReactionKind::Love));
    }

    #[test]
    fn reconcile_keeps_unknown_author_unknown() {
        let mut prev = previous();
        prev.author = None;
        let merged = reconcile(&prev, response());
        assert!(merged.author.is_none());
    }
}
