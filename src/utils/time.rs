use chrono::{Local, LocalResult, NaiveDate, TimeZone};

use crate::error::{AppError, Result};

pub const DATE_INPUT_FMT: &str = "%Y-%m-%d";

/// Parse a user-supplied `YYYY-MM-DD` date input.
pub fn parse_date_input(raw: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(raw.trim(), DATE_INPUT_FMT)?)
}

/// Convert a calendar date to epoch seconds at local midnight, the convention
/// the historical download endpoint expects for its period parameters.
pub fn date_to_epoch_seconds(date: NaiveDate) -> Result<i64> {
    let Some(naive) = date.and_hms_opt(0, 0, 0) else {
        return Err(AppError::message(format!(
            "Unable to construct midnight timestamp for {}",
            date
        )));
    };

    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.timestamp()),
        LocalResult::Ambiguous(first, _) => Ok(first.timestamp()),
        LocalResult::None => Err(AppError::message(format!(
            "No local timestamp exists for {} midnight",
            date
        ))),
    }
}

pub fn snapshot_timestamp_slug() -> String {
    Local::now().format("%Y_%m_%d_%H_%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date_input() {
        let date = parse_date_input("2024-03-15").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn rejects_malformed_date_input() {
        assert!(parse_date_input("15/03/2024").is_err());
        assert!(parse_date_input("").is_err());
    }

    #[test]
    fn epoch_difference_spans_whole_days() {
        // Absolute epoch values depend on the host timezone; the distance
        // between two dates in the same offset does not.
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
        let delta = date_to_epoch_seconds(end).unwrap() - date_to_epoch_seconds(start).unwrap();
        assert_eq!(delta, 10 * 86_400);
    }
}
