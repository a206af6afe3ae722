use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Action label attached to a historical signal. Anything unrecognized is `Other`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TimelineAction {
    Buy,
    Bullish,
    Sell,
    Bearish,
    Hold,
    Neutral,
    #[serde(other)]
    Other,
}

impl TimelineAction {
    /// Only long entries are simulated.
    pub fn opens_long(&self) -> bool {
        matches!(self, TimelineAction::Buy | TimelineAction::Bullish)
    }
}

/// A signal placed on the backtest timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineSignal {
    pub timestamp: DateTime<Utc>,
    pub action: TimelineAction,
    #[serde(default = "default_timeline_confidence")]
    pub confidence: f64,
}

fn default_timeline_confidence() -> f64 {
    50.0
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    EndOfData,
}

/// A simulated position.
///
/// Opened with [`Trade::open`] and closed exactly once with [`Trade::close`],
/// which consumes the open trade and returns the settled one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trade {
    pub token: String,
    pub action: TradeSide,
    pub entry_price: f64,
    /// Currency units committed at entry.
    pub size: f64,
    pub entry_timestamp: DateTime<Utc>,
    pub signal_confidence: f64,
    pub closed: bool,
    pub close_price: Option<f64>,
    pub close_timestamp: Option<DateTime<Utc>>,
    pub realized_pnl: f64,
    pub realized_pnl_pct: f64,
    pub exit_reason: Option<ExitReason>,
}

impl Trade {
    pub fn open(
        token: impl Into<String>,
        action: TradeSide,
        entry_price: f64,
        size: f64,
        entry_timestamp: DateTime<Utc>,
        signal_confidence: f64,
    ) -> Self {
        Self {
            token: token.into(),
            action,
            entry_price,
            size,
            entry_timestamp,
            signal_confidence,
            closed: false,
            close_price: None,
            close_timestamp: None,
            realized_pnl: 0.0,
            realized_pnl_pct: 0.0,
            exit_reason: None,
        }
    }

    /// Percentage return at `price`, signed by side.
    pub fn return_pct(&self, price: f64) -> f64 {
        match self.action {
            TradeSide::Buy => (price - self.entry_price) / self.entry_price * 100.0,
            TradeSide::Sell => (self.entry_price - price) / self.entry_price * 100.0,
        }
    }

    /// Current value of the position at `price`.
    pub fn mark_to_market(&self, price: f64) -> f64 {
        self.size * (1.0 + self.return_pct(price) / 100.0)
    }

    pub fn close(self, price: f64, timestamp: DateTime<Utc>, reason: ExitReason) -> Self {
        let pnl_pct = self.return_pct(price);
        Self {
            closed: true,
            close_price: Some(price),
            close_timestamp: Some(timestamp),
            realized_pnl: self.size * (pnl_pct / 100.0),
            realized_pnl_pct: pnl_pct,
            exit_reason: Some(reason),
            ..self
        }
    }

    pub fn is_winner(&self) -> bool {
        self.realized_pnl > 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
    pub price: f64,
}

/// Metrics and history of one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestResult {
    pub token: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub total_pnl: f64,
    pub total_pnl_pct: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percentage of closed trades with positive pnl.
    pub win_rate: f64,
    /// Largest peak-to-trough retracement of equity, in percent.
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}
