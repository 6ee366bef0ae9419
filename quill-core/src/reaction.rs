use crate::model::ReactionKind;

/// Вычисляет значение `type` для запроса реакции.
///
/// Повторный выбор той же реакции снимает её (`None`), любой другой выбор
/// заменяет текущую.
pub fn toggle(current: Option<ReactionKind>, requested: ReactionKind) -> Option<ReactionKind> {
    if current == Some(requested) {
        None
    } else {
        Some(requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_kind_clears_reaction() {
        assert_eq!(toggle(Some(ReactionKind::Love), ReactionKind::Love), None);
    }

    #[test]
    fn other_kind_replaces_reaction() {
        assert_eq!(
            toggle(Some(ReactionKind::Like), ReactionKind::Laugh),
            Some(ReactionKind::Laugh)
        );
        assert_eq!(toggle(None, ReactionKind::Like), Some(ReactionKind::Like));
    }

    #[test]
    fn toggling_twice_returns_to_no_reaction() {
        for kind in ReactionKind::ALL {
            let first = toggle(None, kind);
            assert_eq!(toggle(first, kind), None);
        }
    }
}
