//! Projection from normalized daily bars to the two chart descriptors the
//! dashboard plots. Pure data shaping; the ratatui rendering lives in `ui`.

use chrono::NaiveDate;

use crate::fetch::DailyBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Line,
    Bar,
}

/// One plottable series: dated points plus the title and legend label shown
/// next to the plot.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub title: String,
    pub label: String,
    pub kind: SeriesKind,
    pub points: Vec<(NaiveDate, f64)>,
}

/// Derive the close-price line series and the volume bar series from one
/// history batch. Point order follows the bar order unchanged.
pub fn project_charts(code: &str, bars: &[DailyBar]) -> (ChartSeries, ChartSeries) {
    let price = ChartSeries {
        title: format!("Price of {}", code),
        label: code.to_string(),
        kind: SeriesKind::Line,
        points: bars.iter().map(|bar| (bar.date, bar.close)).collect(),
    };

    let volume = ChartSeries {
        title: format!("Volume of {}", code),
        label: code.to_string(),
        kind: SeriesKind::Bar,
        points: bars.iter().map(|bar| (bar.date, bar.volume as f64)).collect(),
    };

    (price, volume)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64, volume: u64) -> DailyBar {
        DailyBar {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume,
        }
    }

    #[test]
    fn x_values_round_trip_the_date_sequence() {
        let bars = vec![bar(2, 100.0, 500), bar(3, 101.5, 750), bar(6, 99.0, 320)];

        let (price, volume) = project_charts("2330", &bars);

        let source: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
        let price_x: Vec<NaiveDate> = price.points.iter().map(|(d, _)| *d).collect();
        let volume_x: Vec<NaiveDate> = volume.points.iter().map(|(d, _)| *d).collect();
        assert_eq!(price_x, source);
        assert_eq!(volume_x, source);
    }

    #[test]
    fn titles_and_labels_embed_the_code() {
        let (price, volume) = project_charts("2317", &[bar(2, 100.0, 500)]);

        assert_eq!(price.title, "Price of 2317");
        assert_eq!(volume.title, "Volume of 2317");
        assert_eq!(price.label, "2317");
        assert_eq!(volume.label, "2317");
    }

    #[test]
    fn price_is_a_line_and_volume_a_bar_series() {
        let bars = vec![bar(2, 100.0, 500)];

        let (price, volume) = project_charts("2330", &bars);

        assert_eq!(price.kind, SeriesKind::Line);
        assert_eq!(volume.kind, SeriesKind::Bar);
        assert_eq!(price.points[0].1, 100.0);
        assert_eq!(volume.points[0].1, 500.0);
    }

    #[test]
    fn empty_history_projects_empty_series() {
        let (price, volume) = project_charts("2330", &[]);

        assert!(price.points.is_empty());
        assert!(volume.points.is_empty());
    }
}
