use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::Sentiment;

/// Point-in-time market measurements for a token.
///
/// Named fields cover what the strategies read; anything else a provider
/// supplies lands in `extra`. A missing `price` means "no data".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub chain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fdv: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_5m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_1h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_7d: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_30d: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ath: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ath_change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility_30d: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holders: Option<u64>,
    /// Provider-specific fields (dex id, pair address, dev activity, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Snapshot {
    pub fn new(token: impl Into<String>, chain: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            chain: chain.into(),
            ..Default::default()
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// True when the snapshot carries a usable price.
    pub fn has_price(&self) -> bool {
        matches!(self.price, Some(p) if p.is_finite() && p > 0.0)
    }
}

/// Optional context handed to strategies alongside the snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisContext {
    /// Caller-supplied portfolio state (total value, allocations, limits).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AnalysisContext {
    /// Copy of `base` (or an empty context) carrying the aggregate view of sibling signals.
    pub fn with_aggregate(base: Option<&AnalysisContext>, sentiment: Sentiment, avg: f64) -> Self {
        let mut context = base.cloned().unwrap_or_default();
        context.aggregate_sentiment = Some(sentiment);
        context.avg_confidence = Some(avg);
        context
    }
}

/// One OHLC bar of historical prices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}
