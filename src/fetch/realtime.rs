use std::time::Duration;

use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::config::RealtimeFeedConfig;
use crate::error::{AcquisitionError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One normalized quote-snapshot row.
///
/// The feed keys every record with short codes (`c,n,z,tv,v,o,h,l,y,t`) and
/// quotes all values as strings; both are preserved here. A key absent from
/// the upstream record stays `None` rather than getting a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuoteRow {
    #[serde(rename = "c")]
    pub code: Option<String>,
    #[serde(rename = "n")]
    pub name: Option<String>,
    #[serde(rename = "z")]
    pub last_price: Option<String>,
    #[serde(rename = "tv")]
    pub last_volume: Option<String>,
    #[serde(rename = "v")]
    pub cumulative_volume: Option<String>,
    #[serde(rename = "o")]
    pub open: Option<String>,
    #[serde(rename = "h")]
    pub high: Option<String>,
    #[serde(rename = "l")]
    pub low: Option<String>,
    #[serde(rename = "y")]
    pub prev_close: Option<String>,
    #[serde(rename = "t")]
    pub timestamp: Option<String>,
}

#[derive(Deserialize)]
struct SnapshotEnvelope {
    #[serde(rename = "msgArray")]
    msg_array: Vec<QuoteRow>,
}

/// Split a raw comma-separated code input into the request list.
///
/// Elements are forwarded exactly as typed; an empty element simply produces
/// an empty upstream result for that slot.
pub fn split_code_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}

/// Fetches quote snapshots from the realtime endpoint, one round-trip per
/// code, strictly in the order the codes were supplied.
pub struct RealtimeQuoteFetcher {
    config: RealtimeFeedConfig,
    client: Client,
}

impl RealtimeQuoteFetcher {
    pub fn new(config: RealtimeFeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { config, client })
    }

    /// Fetch one batch of quote rows for the given codes.
    ///
    /// The result is the concatenation of per-code responses in input order;
    /// within a code the upstream array order is kept. Any per-code failure
    /// fails the whole batch; there are no partial realtime results.
    pub async fn fetch(&self, codes: &[String]) -> Result<Vec<QuoteRow>> {
        let mut rows = Vec::new();
        for code in codes {
            let batch = self.fetch_code(code).await?;
            info!("realtime: {} returned {} record(s)", code, batch.len());
            rows.extend(batch);
        }
        Ok(rows)
    }

    async fn fetch_code(&self, code: &str) -> Result<Vec<QuoteRow>> {
        let url = self.config.quote_url(code);

        let response = self.client.get(&url).send().await.map_err(|err| {
            warn!("realtime: request for {} failed: {}", code, err);
            AcquisitionError::RealtimeUnavailable {
                code: code.to_string(),
                reason: err.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("realtime: request for {} returned {}", code, status);
            return Err(AcquisitionError::RealtimeUnavailable {
                code: code.to_string(),
                reason: format!("status {}", status),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|err| AcquisitionError::RealtimeUnavailable {
                code: code.to_string(),
                reason: err.to_string(),
            })?;

        Ok(parse_snapshot(code, &body)?)
    }
}

/// Parse one snapshot response body into quote rows, upstream order kept.
fn parse_snapshot(code: &str, body: &str) -> std::result::Result<Vec<QuoteRow>, AcquisitionError> {
    let envelope: SnapshotEnvelope =
        serde_json::from_str(body).map_err(|err| AcquisitionError::RealtimeMalformed {
            code: code.to_string(),
            reason: err.to_string(),
        })?;
    Ok(envelope.msg_array)
}
