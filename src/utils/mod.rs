pub mod time;

pub use time::{date_to_epoch_seconds, parse_date_input, snapshot_timestamp_slug, DATE_INPUT_FMT};
