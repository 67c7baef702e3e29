//! Compiled-in feed configuration. Both upstream endpoints are fixed for the
//! TWSE / Yahoo Finance pairing this dashboard targets, so there is no config
//! file to load or validate.

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Quote-snapshot endpoint description. The exchange channel parameter wraps
/// the raw instrument code as `tse_{code}.tw`.
#[derive(Debug, Clone)]
pub struct RealtimeFeedConfig {
    pub endpoint: String,
    pub channel_prefix: String,
    pub channel_suffix: String,
    pub user_agent: String,
}

impl RealtimeFeedConfig {
    /// Full request URL for one instrument code.
    pub fn quote_url(&self, code: &str) -> String {
        format!(
            "{}?ex_ch={}{}{}",
            self.endpoint, self.channel_prefix, code, self.channel_suffix
        )
    }
}

/// Historical daily-download endpoint description. The symbol suffix turns a
/// bare code into the exchange-qualified download symbol (`2330` -> `2330.TW`).
#[derive(Debug, Clone)]
pub struct HistoryFeedConfig {
    pub endpoint: String,
    pub symbol_suffix: String,
    pub interval: String,
    pub events: String,
    pub crumb: String,
    pub user_agent: String,
}

impl HistoryFeedConfig {
    /// Full request URL for one code and an epoch-seconds window.
    pub fn download_url(&self, code: &str, period_start: i64, period_end: i64) -> String {
        format!(
            "{endpoint}/{code}{suffix}?period1={start}&period2={end}&interval={interval}&events={events}&crumb={crumb}",
            endpoint = self.endpoint,
            code = code,
            suffix = self.symbol_suffix,
            start = period_start,
            end = period_end,
            interval = self.interval,
            events = self.events,
            crumb = self.crumb,
        )
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub realtime: RealtimeFeedConfig,
    pub history: HistoryFeedConfig,
}

impl Config {
    pub fn builtin() -> Self {
        Self {
            realtime: RealtimeFeedConfig {
                endpoint: "https://mis.twse.com.tw/stock/api/getStockInfo.jsp".to_string(),
                channel_prefix: "tse_".to_string(),
                channel_suffix: ".tw".to_string(),
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
            history: HistoryFeedConfig {
                endpoint: "https://query1.finance.yahoo.com/v7/finance/download".to_string(),
                symbol_suffix: ".TW".to_string(),
                interval: "1d".to_string(),
                events: "history".to_string(),
                crumb: "hP2rOschxO0".to_string(),
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
        }
    }
}
