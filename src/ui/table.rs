use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Row, Table},
};
use unicode_width::UnicodeWidthStr;

/// Column constraints sized to the widest cell per column. Headers carry
/// double-width CJK characters, so sizing goes through display width rather
/// than char counts.
pub fn column_widths(header: &[&str], rows: &[Vec<String>]) -> Vec<Constraint> {
    let mut widths: Vec<usize> = header.iter().map(|cell| cell.width()).collect();

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if idx < widths.len() {
                widths[idx] = widths[idx].max(cell.width());
            }
        }
    }

    widths
        .into_iter()
        .map(|width| Constraint::Length(width as u16))
        .collect()
}

pub fn build_table<'a>(
    rows: Vec<Row<'a>>,
    header: Row<'a>,
    widths: Vec<Constraint>,
    title: impl Into<String>,
) -> Table<'a> {
    Table::new(rows, widths)
        .header(header.bold())
        .block(Block::default().borders(Borders::ALL).title(title.into()))
        .column_spacing(2)
}
