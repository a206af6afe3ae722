use hedgefund_cache::CacheError;

#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("Price history error: {0}")]
    Cache(#[from] CacheError),

    #[error("No price history for {token_id} over the last {days} days")]
    NoHistory { token_id: String, days: u32 },
}
