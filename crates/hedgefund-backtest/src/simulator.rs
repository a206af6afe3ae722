//! Single-position, long-only replay of a signal timeline over price bars.

use chrono::{DateTime, Utc};
use hedgefund_models::backtest::{
    BacktestResult, EquityPoint, ExitReason, TimelineSignal, Trade, TradeSide,
};
use hedgefund_models::config::BacktestConfig;
use hedgefund_models::market::Candle;
use tracing::debug;

use crate::metrics::{max_drawdown, sharpe_ratio, win_rate};

/// A signal applies to a bar when their timestamps are less than this far apart.
const SIGNAL_WINDOW_MS: i64 = 3_600_000;

/// Zero-trade result used when there is nothing to replay.
pub fn empty_result(
    token: &str,
    initial_balance: f64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> BacktestResult {
    BacktestResult {
        token: token.to_string(),
        start_date,
        end_date,
        initial_balance,
        final_balance: initial_balance,
        total_pnl: 0.0,
        total_pnl_pct: 0.0,
        total_trades: 0,
        winning_trades: 0,
        losing_trades: 0,
        win_rate: 0.0,
        max_drawdown: 0.0,
        sharpe_ratio: 0.0,
        trades: Vec::new(),
        equity_curve: Vec::new(),
    }
}

struct Simulation<'a> {
    token: &'a str,
    config: &'a BacktestConfig,
    balance: f64,
    position: Option<Trade>,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,
}

impl<'a> Simulation<'a> {
    fn new(token: &'a str, config: &'a BacktestConfig, bars: usize) -> Self {
        Self {
            token,
            config,
            balance: config.initial_balance,
            position: None,
            trades: Vec::new(),
            equity_curve: Vec::with_capacity(bars),
        }
    }

    fn close_position(&mut self, price: f64, timestamp: DateTime<Utc>, reason: ExitReason) {
        if let Some(open) = self.position.take() {
            let trade = open.close(price, timestamp, reason);
            debug!(
                token = %self.token,
                reason = ?reason,
                pnl = trade.realized_pnl,
                pnl_pct = trade.realized_pnl_pct,
                "Position closed"
            );
            self.balance += trade.size + trade.realized_pnl;
            self.trades.push(trade);
        }
    }

    /// Stop-loss is checked first, so it wins when both thresholds are crossed.
    fn check_exits(&mut self, candle: &Candle) {
        let Some(open) = &self.position else {
            return;
        };
        let r = open.return_pct(candle.close);

        if r <= -self.config.stop_loss_pct {
            self.close_position(candle.close, candle.timestamp, ExitReason::StopLoss);
        } else if r >= self.config.take_profit_pct {
            self.close_position(candle.close, candle.timestamp, ExitReason::TakeProfit);
        }
    }

    fn check_entry(&mut self, candle: &Candle, signals: &[TimelineSignal]) {
        if self.position.is_some() {
            return;
        }

        let trigger = signals.iter().find(|s| {
            (s.timestamp - candle.timestamp).num_milliseconds().abs() < SIGNAL_WINDOW_MS
                && s.confidence >= self.config.min_confidence
                && s.action.opens_long()
        });

        if let Some(signal) = trigger {
            if !(candle.close.is_finite() && candle.close > 0.0) {
                debug!(token = %self.token, price = candle.close, "Skipping entry on unpriced bar");
                return;
            }
            let size = self.balance * (self.config.position_size_pct / 100.0);
            self.balance -= size;
            debug!(token = %self.token, price = candle.close, size, "Position opened");
            self.position = Some(Trade::open(
                self.token,
                TradeSide::Buy,
                candle.close,
                size,
                candle.timestamp,
                signal.confidence,
            ));
        }
    }

    fn record_equity(&mut self, candle: &Candle) {
        let open_value = self
            .position
            .as_ref()
            .map_or(0.0, |p| p.mark_to_market(candle.close));
        self.equity_curve.push(EquityPoint {
            timestamp: candle.timestamp,
            equity: self.balance + open_value,
            price: candle.close,
        });
    }
}

/// Replay `signals` over `candles` (sorted ascending by timestamp).
///
/// Sell and bearish signals are never acted upon. A position still open after
/// the last bar is closed at that bar's price.
pub fn simulate(
    token: &str,
    candles: &[Candle],
    signals: &[TimelineSignal],
    config: &BacktestConfig,
) -> BacktestResult {
    let (Some(first), Some(last)) = (candles.first(), candles.last()) else {
        let now = Utc::now();
        return empty_result(token, config.initial_balance, now, now);
    };

    let mut sim = Simulation::new(token, config, candles.len());
    for candle in candles {
        sim.check_exits(candle);
        sim.check_entry(candle, signals);
        sim.record_equity(candle);
    }
    sim.close_position(last.close, last.timestamp, ExitReason::EndOfData);

    let Simulation {
        balance,
        trades,
        equity_curve,
        ..
    } = sim;

    let initial = config.initial_balance;
    let winning_trades = trades.iter().filter(|t| t.is_winner()).count();
    let total_pnl = balance - initial;

    BacktestResult {
        token: token.to_string(),
        start_date: first.timestamp,
        end_date: last.timestamp,
        initial_balance: initial,
        final_balance: balance,
        total_pnl,
        total_pnl_pct: if initial != 0.0 {
            total_pnl / initial * 100.0
        } else {
            0.0
        },
        total_trades: trades.len(),
        winning_trades,
        losing_trades: trades.len() - winning_trades,
        win_rate: win_rate(&trades),
        max_drawdown: max_drawdown(&equity_curve, initial),
        sharpe_ratio: sharpe_ratio(&equity_curve),
        trades,
        equity_curve,
    }
}
