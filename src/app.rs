use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{info, warn};

use crate::chart::{project_charts, ChartSeries};
use crate::config::Config;
use crate::error::Result;
use crate::fetch::{
    split_code_list, DailyBar, DateRange, HistoricalSeriesFetcher, QuoteRow, RealtimeQuoteFetcher,
};
use crate::ui::{render_dashboard, TerminalGuard};
use crate::utils::{parse_date_input, snapshot_timestamp_slug};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    CodeList,
    HistoryCode,
    StartDate,
    EndDate,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::CodeList => Focus::HistoryCode,
            Focus::HistoryCode => Focus::StartDate,
            Focus::StartDate => Focus::EndDate,
            Focus::EndDate => Focus::CodeList,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::CodeList => Focus::EndDate,
            Focus::HistoryCode => Focus::CodeList,
            Focus::StartDate => Focus::HistoryCode,
            Focus::EndDate => Focus::StartDate,
        }
    }
}

/// Owns the two fetchers and everything the dashboard renders. Each submit
/// runs one fetch-and-render cycle on the event loop; the batch it produces
/// replaces the previous one wholesale.
pub struct DashboardApp {
    realtime: RealtimeQuoteFetcher,
    history: HistoricalSeriesFetcher,
    pub code_input: String,
    pub history_code_input: String,
    pub start_input: String,
    pub end_input: String,
    pub focus: Focus,
    pub quotes: Vec<QuoteRow>,
    pub bars: Vec<DailyBar>,
    bars_code: Option<String>,
    pub price_series: Option<ChartSeries>,
    pub volume_series: Option<ChartSeries>,
    pub status: Option<String>,
}

impl DashboardApp {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            realtime: RealtimeQuoteFetcher::new(config.realtime)?,
            history: HistoricalSeriesFetcher::new(config.history)?,
            code_input: String::new(),
            history_code_input: String::new(),
            start_input: String::new(),
            end_input: String::new(),
            focus: Focus::CodeList,
            quotes: Vec::new(),
            bars: Vec::new(),
            bars_code: None,
            price_series: None,
            volume_series: None,
            status: None,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut guard = TerminalGuard::new()?;

        loop {
            guard.terminal_mut().draw(|f| render_dashboard(f, self))?;

            if !event::poll(POLL_INTERVAL)? {
                continue;
            }

            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if self.handle_key(key).await? {
                        break;
                    }
                }
                _ => {}
            }
        }

        guard.restore()
    }

    /// Returns `true` when the app should exit.
    async fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Esc => return Ok(true),
            KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.export_history();
            }
            KeyCode::Enter => match self.focus {
                Focus::CodeList => self.submit_realtime().await,
                Focus::HistoryCode | Focus::StartDate | Focus::EndDate => {
                    self.submit_history().await
                }
            },
            _ => self.apply_edit(key),
        }
        Ok(false)
    }

    fn apply_edit(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Backspace => {
                self.focused_input_mut().pop();
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.focused_input_mut().push(ch);
            }
            _ => {}
        }
    }

    fn focused_input_mut(&mut self) -> &mut String {
        match self.focus {
            Focus::CodeList => &mut self.code_input,
            Focus::HistoryCode => &mut self.history_code_input,
            Focus::StartDate => &mut self.start_input,
            Focus::EndDate => &mut self.end_input,
        }
    }

    async fn submit_realtime(&mut self) {
        if self.code_input.is_empty() {
            self.status = Some("Enter at least one instrument code.".to_string());
            return;
        }

        let codes = split_code_list(&self.code_input);
        info!("realtime cycle for {} code(s)", codes.len());

        match self.realtime.fetch(&codes).await {
            Ok(rows) => {
                self.quotes = rows;
                // The original dashboard seeds the history input with the
                // first submitted code.
                if let Some(first) = codes.first() {
                    self.history_code_input = first.clone();
                }
                self.status = None;
            }
            Err(err) => {
                warn!("realtime cycle failed: {}", err);
                self.status = Some(err.to_string());
            }
        }
    }

    async fn submit_history(&mut self) {
        if self.history_code_input.is_empty() {
            self.status = Some("Enter an instrument code for the history request.".to_string());
            return;
        }

        let start = match parse_date_input(&self.start_input) {
            Ok(date) => date,
            Err(_) => {
                self.status = Some(format!("Unparseable start date '{}'.", self.start_input));
                return;
            }
        };
        let end = match parse_date_input(&self.end_input) {
            Ok(date) => date,
            Err(_) => {
                self.status = Some(format!("Unparseable end date '{}'.", self.end_input));
                return;
            }
        };

        let code = self.history_code_input.clone();
        info!("history cycle for {} ({} -> {})", code, start, end);

        match self.history.fetch(&code, DateRange { start, end }).await {
            Ok(bars) => {
                let (price, volume) = project_charts(&code, &bars);
                self.bars = bars;
                self.bars_code = Some(code);
                self.price_series = Some(price);
                self.volume_series = Some(volume);
                self.status = None;
            }
            Err(err) => {
                warn!("history cycle failed: {}", err);
                self.status = Some(err.to_string());
            }
        }
    }

    fn export_history(&mut self) {
        if self.bars.is_empty() {
            self.status = Some("No historical rows to export yet.".to_string());
            return;
        }

        let code = self.bars_code.clone().unwrap_or_default();
        let path = format!("history_{}_{}.csv", code, snapshot_timestamp_slug());
        match self.write_history_csv(&path) {
            Ok(()) => self.status = Some(format!("History exported to {}.", path)),
            Err(err) => self.status = Some(format!("Export failed: {}", err)),
        }
    }

    fn write_history_csv(&self, path: &str) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;

        writer.write_record(["Date", "Open", "High", "Low", "Close", "Volume"])?;
        for bar in &self.bars {
            writer.write_record([
                bar.date.to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}
