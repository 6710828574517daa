//! Ordering rules for research themes.
//!
//! Theme `order` values are a dense permutation of `1..=N`. Every operation
//! here re-establishes that after it runs, even when the input list arrived
//! with gaps or duplicates from a hand-edited index.

use crate::domain::entities::ResearchTheme;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Sort by current `order` (ties keep list position) and renumber `1..=N`.
pub fn normalize_order(themes: &mut [ResearchTheme]) {
    themes.sort_by_key(|theme| theme.order);
    for (position, theme) in themes.iter_mut().enumerate() {
        theme.order = position as u32 + 1;
    }
}

/// Swap the theme at display position `index` with its neighbour.
///
/// Returns `Ok(false)` when the theme is already at the boundary in the
/// requested direction; the list is still normalized in that case.
pub fn move_theme(
    themes: &mut [ResearchTheme],
    index: usize,
    direction: MoveDirection,
) -> Result<bool, DomainError> {
    if index >= themes.len() {
        return Err(DomainError::validation(format!(
            "theme position {index} is out of range for {} themes",
            themes.len()
        )));
    }

    normalize_order(themes);

    let neighbour = match direction {
        MoveDirection::Up if index > 0 => index - 1,
        MoveDirection::Down if index + 1 < themes.len() => index + 1,
        _ => return Ok(false),
    };

    let moving = themes[index].order;
    themes[index].order = themes[neighbour].order;
    themes[neighbour].order = moving;
    themes.swap(index, neighbour);

    Ok(true)
}

/// Append a theme at the end of the display sequence.
pub fn append_theme(
    themes: &mut Vec<ResearchTheme>,
    mut theme: ResearchTheme,
) -> Result<(), DomainError> {
    if theme.id.trim().is_empty() {
        return Err(DomainError::validation("theme id must not be empty"));
    }
    if themes.iter().any(|existing| existing.id == theme.id) {
        return Err(DomainError::validation(format!(
            "theme `{}` already exists",
            theme.id
        )));
    }
    normalize_order(themes);
    theme.order = themes.len() as u32 + 1;
    themes.push(theme);
    Ok(())
}

/// Remove a theme by id and close the gap it leaves in the ordering.
pub fn remove_theme(
    themes: &mut Vec<ResearchTheme>,
    theme_id: &str,
) -> Result<ResearchTheme, DomainError> {
    let position = themes
        .iter()
        .position(|theme| theme.id == theme_id)
        .ok_or_else(|| DomainError::not_found("theme"))?;
    let removed = themes.remove(position);
    normalize_order(themes);
    Ok(removed)
}

pub fn is_dense(themes: &[ResearchTheme]) -> bool {
    let mut orders: Vec<u32> = themes.iter().map(|theme| theme.order).collect();
    orders.sort_unstable();
    orders
        .iter()
        .enumerate()
        .all(|(position, order)| *order == position as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::LocalizedString;
    use crate::domain::types::ResearchStatus;

    fn theme(id: &str, order: u32) -> ResearchTheme {
        ResearchTheme {
            id: id.to_string(),
            title: LocalizedString::new(id, id),
            description: LocalizedString::default(),
            hypothesis: LocalizedString::default(),
            status: ResearchStatus::Exploring,
            order,
            cover_image: None,
        }
    }

    fn orders(themes: &[ResearchTheme]) -> Vec<(String, u32)> {
        themes.iter().map(|t| (t.id.clone(), t.order)).collect()
    }

    #[test]
    fn moving_first_theme_down_swaps_orders() {
        let mut themes = vec![theme("a", 1), theme("b", 2), theme("c", 3)];
        assert!(move_theme(&mut themes, 0, MoveDirection::Down).expect("move"));

        let a = themes.iter().find(|t| t.id == "a").expect("theme a");
        assert_eq!(a.order, 2);
        assert_eq!(
            orders(&themes),
            vec![("b".into(), 1), ("a".into(), 2), ("c".into(), 3)]
        );
    }

    #[test]
    fn boundary_moves_are_no_ops() {
        let mut themes = vec![theme("a", 1), theme("b", 2)];
        assert!(!move_theme(&mut themes, 0, MoveDirection::Up).expect("move"));
        assert!(!move_theme(&mut themes, 1, MoveDirection::Down).expect("move"));
        assert_eq!(orders(&themes), vec![("a".into(), 1), ("b".into(), 2)]);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut themes = vec![theme("a", 1)];
        assert!(move_theme(&mut themes, 3, MoveDirection::Up).is_err());
    }

    #[test]
    fn every_move_keeps_orders_dense() {
        for len in 1..=6usize {
            for index in 0..len {
                for direction in [MoveDirection::Up, MoveDirection::Down] {
                    // Start from a gapped, duplicated ordering to exercise normalization.
                    let mut themes: Vec<ResearchTheme> = (0..len)
                        .map(|i| theme(&format!("t{i}"), (i as u32 / 2) * 5 + 3))
                        .collect();
                    move_theme(&mut themes, index, direction).expect("move");
                    assert!(is_dense(&themes), "len={len} index={index} {direction:?}");
                    let displayed: Vec<u32> = themes.iter().map(|t| t.order).collect();
                    let expected: Vec<u32> = (1..=len as u32).collect();
                    assert_eq!(displayed, expected);
                }
            }
        }
    }

    #[test]
    fn append_and_remove_keep_sequence_dense() {
        let mut themes = vec![theme("a", 1), theme("b", 4)];
        append_theme(&mut themes, theme("c", 99)).expect("append");
        assert_eq!(
            orders(&themes),
            vec![("a".into(), 1), ("b".into(), 2), ("c".into(), 3)]
        );

        assert!(append_theme(&mut themes, theme("a", 1)).is_err());

        let removed = remove_theme(&mut themes, "b").expect("remove");
        assert_eq!(removed.id, "b");
        assert_eq!(orders(&themes), vec![("a".into(), 1), ("c".into(), 2)]);
        assert_eq!(
            remove_theme(&mut themes, "zzz"),
            Err(DomainError::not_found("theme"))
        );
    }
}
