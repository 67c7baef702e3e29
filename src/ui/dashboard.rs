use ratatui::{
    prelude::*,
    widgets::{Axis, BarChart, Block, Borders, Chart, Dataset, GraphType, Paragraph, Row},
};

use crate::app::{DashboardApp, Focus};
use crate::chart::ChartSeries;
use crate::fetch::{DailyBar, QuoteRow};
use crate::ui::table::{build_table, column_widths};
use crate::ui::utils::{split_horizontal, split_vertical};

/// Realtime table headers, in short-key order (`c,n,z,tv,v,o,h,l,y,t`),
/// using the display names the original dashboard shows.
const REALTIME_HEADERS: [&str; 10] = [
    "股票代號",
    "公司名稱",
    "成交價",
    "當盤成交量",
    "累積成交量",
    "開盤價",
    "最高",
    "最低",
    "昨收",
    "時間",
];

const HISTORY_HEADERS: [&str; 6] = ["日期", "開盤", "最高", "最低", "收盤", "成交量(股)"];

const HELP_TEXT: &str =
    "Tab switch field • Enter submit • Ctrl-E export history CSV • Esc quit";

pub fn render_dashboard(f: &mut Frame<'_>, app: &DashboardApp) {
    let outer = split_vertical(f.size(), &[Constraint::Min(10), Constraint::Length(1)]);
    let columns = split_horizontal(
        outer[0],
        &[Constraint::Percentage(50), Constraint::Percentage(50)],
    );

    render_realtime_card(f, columns[0], app);
    render_history_card(f, columns[1], app);
    render_status_line(f, outer[1], app);
}

fn render_realtime_card(f: &mut Frame<'_>, area: Rect, app: &DashboardApp) {
    let segments = split_vertical(area, &[Constraint::Length(3), Constraint::Min(3)]);

    render_input(
        f,
        segments[0],
        "即時報價 (comma-separated codes)",
        &app.code_input,
        app.focus == Focus::CodeList,
    );

    let cells: Vec<Vec<String>> = app.quotes.iter().map(quote_cells).collect();
    let widths = column_widths(&REALTIME_HEADERS, &cells);
    let rows: Vec<Row<'_>> = cells.into_iter().map(Row::new).collect();
    let table = build_table(rows, Row::new(REALTIME_HEADERS.to_vec()), widths, "即時報價");
    f.render_widget(table, segments[1]);
}

fn render_history_card(f: &mut Frame<'_>, area: Rect, app: &DashboardApp) {
    let segments = split_vertical(
        area,
        &[
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    );

    let inputs = split_horizontal(
        segments[0],
        &[
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ],
    );
    render_input(
        f,
        inputs[0],
        "歷史資料 (code)",
        &app.history_code_input,
        app.focus == Focus::HistoryCode,
    );
    render_input(
        f,
        inputs[1],
        "開始日期",
        &app.start_input,
        app.focus == Focus::StartDate,
    );
    render_input(
        f,
        inputs[2],
        "結束日期",
        &app.end_input,
        app.focus == Focus::EndDate,
    );

    let cells: Vec<Vec<String>> = app.bars.iter().map(bar_cells).collect();
    let widths = column_widths(&HISTORY_HEADERS, &cells);
    let rows: Vec<Row<'_>> = cells.into_iter().map(Row::new).collect();
    let table = build_table(rows, Row::new(HISTORY_HEADERS.to_vec()), widths, "歷史資料");
    f.render_widget(table, segments[1]);

    render_price_chart(f, segments[2], app.price_series.as_ref());
    render_volume_chart(f, segments[3], app.volume_series.as_ref());
}

fn render_input(f: &mut Frame<'_>, area: Rect, title: &str, value: &str, focused: bool) {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let input = Paragraph::new(value.to_string()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title(title.to_string()),
    );
    f.render_widget(input, area);
}

fn render_price_chart(f: &mut Frame<'_>, area: Rect, series: Option<&ChartSeries>) {
    let Some(series) = series.filter(|s| !s.points.is_empty()) else {
        render_chart_placeholder(f, area, "Price");
        return;
    };

    let points: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(idx, (_, close))| (idx as f64, *close))
        .collect();

    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for (_, close) in &points {
        y_min = y_min.min(*close);
        y_max = y_max.max(*close);
    }
    let y_pad = ((y_max - y_min) * 0.05).max(0.01);

    let first_label = series.points.first().map(|(d, _)| d.to_string()).unwrap_or_default();
    let last_label = series.points.last().map(|(d, _)| d.to_string()).unwrap_or_default();

    let dataset = Dataset::default()
        .name(series.label.clone())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(series.title.clone()),
        )
        .x_axis(
            Axis::default()
                .bounds([0.0, (points.len().saturating_sub(1)).max(1) as f64])
                .labels(vec![Span::raw(first_label), Span::raw(last_label)])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([y_min - y_pad, y_max + y_pad])
                .labels(vec![
                    Span::raw(format!("{:.2}", y_min)),
                    Span::raw(format!("{:.2}", y_max)),
                ])
                .style(Style::default().fg(Color::DarkGray)),
        );

    f.render_widget(chart, area);
}

fn render_volume_chart(f: &mut Frame<'_>, area: Rect, series: Option<&ChartSeries>) {
    let Some(series) = series.filter(|s| !s.points.is_empty()) else {
        render_chart_placeholder(f, area, "Volume");
        return;
    };

    const BAR_WIDTH: u16 = 5;
    const BAR_GAP: u16 = 1;

    // Only the most recent bars that fit the panel width are drawn.
    let capacity = (area.width.saturating_sub(2) / (BAR_WIDTH + BAR_GAP)).max(1) as usize;
    let visible = series.points.len().saturating_sub(capacity);

    let labelled: Vec<(String, u64)> = series.points[visible..]
        .iter()
        .map(|(date, volume)| (date.format("%m-%d").to_string(), *volume as u64))
        .collect();
    let data: Vec<(&str, u64)> = labelled
        .iter()
        .map(|(label, volume)| (label.as_str(), *volume))
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(series.title.clone()),
        )
        .data(&data)
        .bar_width(BAR_WIDTH)
        .bar_gap(BAR_GAP)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green));

    f.render_widget(chart, area);
}

fn render_chart_placeholder(f: &mut Frame<'_>, area: Rect, name: &str) {
    f.render_widget(
        Paragraph::new("Submit a history request to plot this series.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(name.to_string())),
        area,
    );
}

fn render_status_line(f: &mut Frame<'_>, area: Rect, app: &DashboardApp) {
    let (text, style) = match &app.status {
        Some(message) => (message.clone(), Style::default().fg(Color::Red)),
        None => (HELP_TEXT.to_string(), Style::default().fg(Color::DarkGray)),
    };
    f.render_widget(Paragraph::new(text).style(style), area);
}

fn quote_cells(row: &QuoteRow) -> Vec<String> {
    // Missing upstream keys render as blank cells, never a made-up value.
    [
        &row.code,
        &row.name,
        &row.last_price,
        &row.last_volume,
        &row.cumulative_volume,
        &row.open,
        &row.high,
        &row.low,
        &row.prev_close,
        &row.timestamp,
    ]
    .into_iter()
    .map(|field| field.clone().unwrap_or_default())
    .collect()
}

fn bar_cells(bar: &DailyBar) -> Vec<String> {
    vec![
        bar.date.to_string(),
        format!("{:.2}", bar.open),
        format!("{:.2}", bar.high),
        format!("{:.2}", bar.low),
        format!("{:.2}", bar.close),
        bar.volume.to_string(),
    ]
}
