use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration, Utc};
use hedgefund_cache::CandleSource;
use hedgefund_models::backtest::{BacktestResult, TimelineSignal};
use hedgefund_models::config::BacktestConfig;
use hedgefund_models::market::Candle;
use tracing::{info, warn};

use crate::error::BacktestError;
use crate::simulator::{empty_result, simulate};

/// Replays signal timelines against price history from a [`CandleSource`].
pub struct BacktestEngine {
    candles: Arc<dyn CandleSource>,
    config: BacktestConfig,
}

impl BacktestEngine {
    pub fn new(candles: Arc<dyn CandleSource>, config: BacktestConfig) -> Self {
        Self { candles, config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Backtest `signals` over the last `days` days of `token_id`.
    ///
    /// Missing or unreadable price history yields a zero-trade result spanning
    /// the requested window.
    pub async fn run(&self, token_id: &str, signals: &[TimelineSignal], days: u32) -> BacktestResult {
        match self.try_run(token_id, signals, days).await {
            Ok(result) => result,
            Err(e) => {
                warn!(token = %token_id, days, error = %e, "Backtest without price history");
                let now = Utc::now();
                empty_result(
                    token_id,
                    self.config.initial_balance,
                    now - Duration::days(i64::from(days)),
                    now,
                )
            }
        }
    }

    /// Like [`run`](Self::run), but surfaces missing history as an error.
    pub async fn try_run(
        &self,
        token_id: &str,
        signals: &[TimelineSignal],
        days: u32,
    ) -> Result<BacktestResult, BacktestError> {
        let start = Instant::now();
        let candles = self.load_candles(token_id, days).await?;

        let result = simulate(token_id, &candles, signals, &self.config);
        info!(
            token = %token_id,
            bars = candles.len(),
            signals = signals.len(),
            trades = result.total_trades,
            total_pnl_pct = result.total_pnl_pct,
            elapsed_ms = start.elapsed().as_millis(),
            "Backtest complete"
        );
        Ok(result)
    }

    async fn load_candles(&self, token_id: &str, days: u32) -> Result<Vec<Candle>, BacktestError> {
        let mut candles = self.candles.fetch_candles(token_id, days).await?;
        if candles.is_empty() {
            return Err(BacktestError::NoHistory {
                token_id: token_id.to_string(),
                days,
            });
        }
        candles.sort_by_key(|c| c.timestamp);
        candles.dedup_by_key(|c| c.timestamp);
        Ok(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hedgefund_cache::{CacheError, CacheReader, SqliteReader};
    use hedgefund_models::backtest::TimelineAction;
    use hedgefund_models::cache_schema::{key_patterns, CacheCategory};

    struct OfflineCandles;

    #[async_trait]
    impl CandleSource for OfflineCandles {
        async fn fetch_candles(&self, _token_id: &str, _days: u32) -> Result<Vec<Candle>, CacheError> {
            Err(CacheError::Unavailable("price provider offline".to_string()))
        }
    }

    struct RepeatingCandles;

    #[async_trait]
    impl CandleSource for RepeatingCandles {
        async fn fetch_candles(&self, _token_id: &str, _days: u32) -> Result<Vec<Candle>, CacheError> {
            let base = Utc::now() - Duration::hours(3);
            let bar = |hours: i64, close: f64| Candle {
                timestamp: base + Duration::hours(hours),
                open: close,
                high: close,
                low: close,
                close,
            };
            Ok(vec![bar(1, 1.1), bar(0, 1.0), bar(1, 1.1)])
        }
    }

    fn seeded_reader(closes: &[f64]) -> Arc<CacheReader> {
        let sqlite = SqliteReader::open_in_memory().unwrap();
        let first = Utc::now() - Duration::days(closes.len() as i64);
        let candles: Vec<Candle> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: first + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
            })
            .collect();
        sqlite
            .put_json(
                &key_patterns::candles("bonk"),
                CacheCategory::Candles,
                Some("bonk"),
                &candles,
                Duration::hours(1),
            )
            .unwrap();
        Arc::new(CacheReader::new(sqlite, 100, std::time::Duration::from_secs(60)))
    }

    #[tokio::test]
    async fn run_replays_cached_history() {
        let reader = seeded_reader(&[1.0, 1.0, 1.2, 1.2]);
        let engine = BacktestEngine::new(reader, BacktestConfig::default());
        let history = engine.candles.fetch_candles("bonk", 30).await.unwrap();

        let signals = vec![TimelineSignal {
            timestamp: history[1].timestamp,
            action: TimelineAction::Bullish,
            confidence: 75.0,
        }];

        let result = engine.run("bonk", &signals, 30).await;
        assert_eq!(result.total_trades, 1);
        assert_eq!(result.equity_curve.len(), 4);
        assert_eq!(result.trades[0].exit_reason, Some(hedgefund_models::ExitReason::TakeProfit));
        assert!(result.final_balance > result.initial_balance);
    }

    #[tokio::test]
    async fn missing_history_is_zero_trade_result() {
        let engine = BacktestEngine::new(seeded_reader(&[]), BacktestConfig::default());
        let result = engine.run("unknown", &[], 14).await;

        assert_eq!(result.total_trades, 0);
        assert_eq!(result.final_balance, result.initial_balance);
        assert_eq!(result.win_rate, 0.0);
        assert!(result.equity_curve.is_empty());
        assert_eq!((result.end_date - result.start_date).num_days(), 14);

        assert!(matches!(
            engine.try_run("unknown", &[], 14).await,
            Err(BacktestError::NoHistory { days: 14, .. })
        ));
    }

    #[tokio::test]
    async fn repeated_bars_from_source_are_collapsed() {
        let engine = BacktestEngine::new(Arc::new(RepeatingCandles), BacktestConfig::default());
        let result = engine.run("bonk", &[], 1).await;

        assert_eq!(result.equity_curve.len(), 2);
        assert!(result
            .equity_curve
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[tokio::test]
    async fn source_errors_degrade_to_zero_trades() {
        let engine = BacktestEngine::new(Arc::new(OfflineCandles), BacktestConfig::default());
        let result = engine.run("bonk", &[], 30).await;
        assert_eq!(result.total_trades, 0);
        assert_eq!(result.total_pnl, 0.0);

        assert!(matches!(
            engine.try_run("bonk", &[], 30).await,
            Err(BacktestError::Cache(_))
        ));
    }
}
