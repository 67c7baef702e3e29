use thiserror::Error;

pub use anyhow::Context;

pub type Result<T> = std::result::Result<T, AppError>;

/// Per-feed acquisition failures surfaced to the dashboard status line.
///
/// "Unavailable" covers transport failures and non-success statuses;
/// "Malformed" covers a reachable feed whose payload cannot be normalized.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("realtime feed unreachable for {code}: {reason}")]
    RealtimeUnavailable { code: String, reason: String },
    #[error("realtime feed malformed for {code}: {reason}")]
    RealtimeMalformed { code: String, reason: String },
    #[error("historical feed unreachable for {code}: {reason}")]
    HistoricalUnavailable { code: String, reason: String },
    #[error("historical feed malformed for {code}: {reason}")]
    HistoricalMalformed { code: String, reason: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    Chrono(#[from] chrono::ParseError),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn message<T: Into<String>>(msg: T) -> Self {
        AppError::Message(msg.into())
    }
}
