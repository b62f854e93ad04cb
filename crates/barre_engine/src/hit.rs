//! Pointer hit testing over a published Action generation.

use crate::action::Action;

/// Names of every clickable Action whose frame contains the point.
///
/// Bounds are inclusive on all four edges. Overlapping regions all
/// report, in declaration order.
pub fn hit_test(actions: &[Action], x: f32, y: f32) -> Vec<&str> {
    actions
        .iter()
        .filter(|a| a.rect.contains(x, y))
        .filter_map(|a| a.name.as_deref())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::geom::{Outline, Rect};
    use barre_markup::Color;

    fn clickable(name: Option<&str>, rect: Rect) -> Action {
        Action {
            rect,
            margin: Outline::default(),
            padding: Outline::default(),
            bg: Color::BLACK,
            name: name.map(str::to_string),
            kind: ActionKind::Rule {
                color: Color::WHITE,
                style: Default::default(),
            },
        }
    }

    #[test]
    fn test_center_hit() {
        let actions = vec![clickable(Some("btn"), Rect::new(10.0, 0.0, 20.0, 20.0))];
        assert_eq!(hit_test(&actions, 20.0, 10.0), vec!["btn"]);
    }

    #[test]
    fn test_edges_inclusive() {
        let actions = vec![clickable(Some("btn"), Rect::new(10.0, 0.0, 20.0, 20.0))];
        assert_eq!(hit_test(&actions, 10.0, 0.0), vec!["btn"]);
        assert_eq!(hit_test(&actions, 30.0, 20.0), vec!["btn"]);
        assert!(hit_test(&actions, 30.5, 20.0).is_empty());
    }

    #[test]
    fn test_unnamed_actions_silent() {
        let actions = vec![clickable(None, Rect::new(0.0, 0.0, 100.0, 20.0))];
        assert!(hit_test(&actions, 50.0, 10.0).is_empty());
    }

    #[test]
    fn test_overlaps_report_all_in_order() {
        let actions = vec![
            clickable(Some("outer"), Rect::new(0.0, 0.0, 100.0, 20.0)),
            clickable(Some("inner"), Rect::new(40.0, 0.0, 20.0, 20.0)),
        ];
        assert_eq!(hit_test(&actions, 50.0, 10.0), vec!["outer", "inner"]);
    }
}
