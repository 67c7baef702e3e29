use std::io::Cursor;
use std::time::Duration;

use chrono::NaiveDate;
use csv::StringRecord;
use log::{info, warn};
use reqwest::Client;

use crate::config::HistoryFeedConfig;
use crate::error::{AcquisitionError, Result};
use crate::utils::date_to_epoch_seconds;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Cell value the download feed emits for a missing field.
const NULL_SENTINEL: &str = "null";

const DATE_FMT: &str = "%Y-%m-%d";

/// One trading day's normalized bar. Prices are finite numbers and volume is
/// a whole share count; a source row that cannot satisfy that never becomes
/// a bar.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Requested calendar window. `start <= end` is not enforced; an inverted
/// range just produces an empty download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Fetches the daily-bar history for one instrument over a date range.
pub struct HistoricalSeriesFetcher {
    config: HistoryFeedConfig,
    client: Client,
}

impl HistoricalSeriesFetcher {
    pub fn new(config: HistoryFeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { config, client })
    }

    /// Download and normalize one batch of daily bars, ascending by date
    /// (the feed's own order). A well-formed response with no trading days
    /// yields an empty vector, not an error.
    pub async fn fetch(&self, code: &str, range: DateRange) -> Result<Vec<DailyBar>> {
        let period_start = date_to_epoch_seconds(range.start)?;
        let period_end = date_to_epoch_seconds(range.end)?;
        let url = self.config.download_url(code, period_start, period_end);

        let response = self.client.post(&url).send().await.map_err(|err| {
            warn!("history: request for {} failed: {}", code, err);
            AcquisitionError::HistoricalUnavailable {
                code: code.to_string(),
                reason: err.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("history: request for {} returned {}", code, status);
            return Err(AcquisitionError::HistoricalUnavailable {
                code: code.to_string(),
                reason: format!("status {}", status),
            }
            .into());
        }

        let body =
            response
                .text()
                .await
                .map_err(|err| AcquisitionError::HistoricalUnavailable {
                    code: code.to_string(),
                    reason: err.to_string(),
                })?;

        let bars = parse_history_csv(code, &body)?;
        info!("history: {} normalized to {} bar(s)", code, bars.len());
        Ok(bars)
    }
}

/// Resolved positions of the six mapped columns; `AdjClose` is ignored.
struct ColumnMap {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl ColumnMap {
    fn resolve(
        code: &str,
        headers: &StringRecord,
    ) -> std::result::Result<Self, AcquisitionError> {
        let position = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                AcquisitionError::HistoricalMalformed {
                    code: code.to_string(),
                    reason: format!("response is missing the {} column", name),
                }
            })
        };

        Ok(Self {
            date: position("Date")?,
            open: position("Open")?,
            high: position("High")?,
            low: position("Low")?,
            close: position("Close")?,
            volume: position("Volume")?,
        })
    }

    fn cells<'a>(&self, record: &'a StringRecord) -> [Option<&'a str>; 6] {
        [
            record.get(self.date),
            record.get(self.open),
            record.get(self.high),
            record.get(self.low),
            record.get(self.close),
            record.get(self.volume),
        ]
    }
}

/// Normalize one download body into daily bars.
///
/// Columns are resolved by header name, so the feed may reorder them. A row
/// carrying the `"null"` sentinel in any column — ignored columns included —
/// or a structurally absent mapped cell is dropped whole; any cell that then
/// still fails numeric coercion fails the entire batch.
pub fn parse_history_csv(
    code: &str,
    body: &str,
) -> std::result::Result<Vec<DailyBar>, AcquisitionError> {
    let malformed = |reason: String| AcquisitionError::HistoricalMalformed {
        code: code.to_string(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(body));

    let headers = reader
        .headers()
        .map_err(|err| malformed(format!("unreadable header row: {}", err)))?
        .clone();
    let columns = ColumnMap::resolve(code, &headers)?;

    let mut bars = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|err| malformed(format!("unreadable record: {}", err)))?;

        // The sentinel discards the row no matter which column carries it,
        // even one the bar never uses.
        let cells = columns.cells(&record);
        if record.iter().any(|cell| cell == NULL_SENTINEL)
            || cells.iter().any(|cell| cell.is_none())
        {
            warn!("history: {} dropped a row with a missing value", code);
            continue;
        }

        // Null-filtered cells are guaranteed present by the check above.
        let [date_cell, open_cell, high_cell, low_cell, close_cell, volume_cell] =
            cells.map(|cell| cell.unwrap_or_default());

        let date = NaiveDate::parse_from_str(date_cell, DATE_FMT)
            .map_err(|_| malformed(format!("unparseable date '{}'", date_cell)))?;

        let parse_price = |value: &str| {
            value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|parsed| parsed.is_finite())
                .ok_or_else(|| malformed(format!("unparseable price '{}'", value)))
        };

        let volume = volume_cell
            .trim()
            .parse::<u64>()
            .map_err(|_| malformed(format!("unparseable volume '{}'", volume_cell)))?;

        bars.push(DailyBar {
            date,
            open: parse_price(open_cell)?,
            high: parse_price(high_cell)?,
            low: parse_price(low_cell)?,
            close: parse_price(close_cell)?,
            volume,
        });
    }

    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-03-11,770.00,775.00,768.00,772.00,770.55,21903483
2024-03-12,774.00,781.00,773.00,779.00,777.53,25160119
2024-03-13,780.00,784.00,777.00,784.00,782.52,23214155
2024-03-14,783.00,790.00,null,788.00,786.51,30112840
2024-03-15,786.00,789.00,782.00,783.00,781.52,27645030
";

    #[test]
    fn drops_rows_containing_the_null_sentinel() {
        // Yahoo writes the adjusted-close header as "Adj Close"; the column
        // map only cares about the six mapped names.
        let bars = parse_history_csv("2330", FIXTURE).unwrap();

        assert_eq!(bars.len(), 4);
        assert!(bars
            .iter()
            .all(|bar| bar.date != NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()));
    }

    #[test]
    fn null_in_an_ignored_column_still_drops_the_row() {
        let body = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-03-11,770.00,775.00,768.00,772.00,null,21903483
2024-03-12,774.00,781.00,773.00,779.00,777.53,25160119
";

        let bars = parse_history_csv("2330", body).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());
    }

    #[test]
    fn keeps_feed_date_order() {
        let bars = parse_history_csv("2330", FIXTURE).unwrap();

        let dates: Vec<NaiveDate> = bars.iter().map(|bar| bar.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(bars[0].open, 770.00);
        assert_eq!(bars[0].close, 772.00);
        assert_eq!(bars[0].volume, 21903483);
    }

    #[test]
    fn header_only_body_yields_empty_batch() {
        let bars = parse_history_csv("2330", "Date,Open,High,Low,Close,Adj Close,Volume\n");

        assert_eq!(bars.unwrap(), Vec::new());
    }

    #[test]
    fn resolves_columns_by_name_not_position() {
        let body = "\
Volume,Close,Date,Low,High,Open
1000,102.0,2024-01-02,99.0,103.0,100.0
";

        let bars = parse_history_csv("2330", body).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].close, 102.0);
        assert_eq!(bars[0].volume, 1000);
    }

    #[test]
    fn missing_required_column_is_malformed() {
        let body = "Date,Open,High,Low,Close\n2024-01-02,1,2,0,1\n";

        let err = parse_history_csv("2330", body).unwrap_err();

        assert!(matches!(
            err,
            AcquisitionError::HistoricalMalformed { ref code, ref reason }
                if code == "2330" && reason.contains("Volume")
        ));
    }

    #[test]
    fn unparseable_cell_after_null_filter_fails_the_batch() {
        let body = "\
Date,Open,High,Low,Close,Volume
2024-01-02,100.0,103.0,99.0,abc,1000
";

        let err = parse_history_csv("2330", body).unwrap_err();

        assert!(matches!(err, AcquisitionError::HistoricalMalformed { .. }));
    }

    #[test]
    fn fractional_volume_is_malformed() {
        let body = "\
Date,Open,High,Low,Close,Volume
2024-01-02,100.0,103.0,99.0,102.0,10.5
";

        assert!(parse_history_csv("2330", body).is_err());
    }

    #[test]
    fn normalization_is_deterministic() {
        let first = parse_history_csv("2330", FIXTURE).unwrap();
        let second = parse_history_csv("2330", FIXTURE).unwrap();

        assert_eq!(first, second);
    }

    mod fetching {
        use super::*;
        use crate::error::AppError;
        use crate::fetch::testing::spawn_stub_feed;
        use std::net::SocketAddr;

        fn stub_config(addr: SocketAddr) -> HistoryFeedConfig {
            HistoryFeedConfig {
                endpoint: format!("http://{}/v7/finance/download", addr),
                symbol_suffix: ".TW".to_string(),
                interval: "1d".to_string(),
                events: "history".to_string(),
                crumb: "test".to_string(),
                user_agent: "stock-dash-tests".to_string(),
            }
        }

        fn range() -> DateRange {
            DateRange {
                start: NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            }
        }

        #[tokio::test]
        async fn server_error_fails_the_batch_as_unavailable() {
            let addr = spawn_stub_feed(1, |_| (500, String::new())).await;
            let fetcher = HistoricalSeriesFetcher::new(stub_config(addr)).unwrap();

            let err = fetcher.fetch("2330", range()).await.unwrap_err();

            assert!(matches!(
                err,
                AppError::Acquisition(AcquisitionError::HistoricalUnavailable { ref code, .. })
                    if code == "2330"
            ));
        }

        #[tokio::test]
        async fn downloads_and_normalizes_a_live_body() {
            let addr = spawn_stub_feed(1, |request| {
                // Wrong download symbol would surface as an unavailable batch.
                if request.contains("/2330.TW?") {
                    (200, FIXTURE.to_string())
                } else {
                    (404, String::new())
                }
            })
            .await;
            let fetcher = HistoricalSeriesFetcher::new(stub_config(addr)).unwrap();

            let bars = fetcher.fetch("2330", range()).await.unwrap();

            assert_eq!(bars.len(), 4);
            assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        }
    }
}
