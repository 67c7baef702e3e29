use ratatui::layout::{Constraint, Layout, Rect};

/// Stack an area top to bottom into one rect per constraint.
pub fn split_vertical(area: Rect, constraints: &[Constraint]) -> Vec<Rect> {
    Layout::vertical(constraints.iter().copied())
        .split(area)
        .to_vec()
}

/// Split an area left to right into one rect per constraint.
pub fn split_horizontal(area: Rect, constraints: &[Constraint]) -> Vec<Rect> {
    Layout::horizontal(constraints.iter().copied())
        .split(area)
        .to_vec()
}
