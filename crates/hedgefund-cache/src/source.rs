use async_trait::async_trait;
use hedgefund_models::market::{Candle, Snapshot};

use crate::error::CacheError;

/// Where the orchestrator gets market snapshots from.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// `Ok(None)` when nothing is known about the token on that chain.
    async fn get_snapshot(&self, token: &str, chain: &str) -> Result<Option<Snapshot>, CacheError>;
}

/// Where the backtest engine gets historical prices from.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Candles covering the last `days` days, oldest first.
    async fn fetch_candles(&self, token_id: &str, days: u32) -> Result<Vec<Candle>, CacheError>;
}
