use serde::{Deserialize, Serialize};

/// Categories for organizing cache keys.
/// The market-data pipeline uses these when writing to the shared SQLite cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CacheCategory {
    Snapshot,
    Candles,
}

impl CacheCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheCategory::Snapshot => "snapshot",
            CacheCategory::Candles => "candles",
        }
    }
}

/// The SQLite table the market-data pipeline writes and the cache reader reads.
pub const CACHE_TABLE_DDL: &str = "\
CREATE TABLE IF NOT EXISTS cache_entries (
    key         TEXT PRIMARY KEY,
    category    TEXT NOT NULL,
    value_json  TEXT NOT NULL,
    source      TEXT NOT NULL,
    symbol      TEXT,
    created_at  TEXT NOT NULL,
    expires_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_cache_category ON cache_entries(category);
CREATE INDEX IF NOT EXISTS idx_cache_symbol ON cache_entries(symbol);
CREATE INDEX IF NOT EXISTS idx_cache_expires ON cache_entries(expires_at);
";

/// Key pattern conventions for the cache.
///
/// - Snapshots: `snapshot:{chain}:{token}` (e.g., `snapshot:solana:BONK`), value is a `Snapshot`
/// - Candles: `candles:{token}` (e.g., `candles:solana`), value is an array of `Candle`
///
/// Tokens are lowercased so lookups are case-insensitive.
pub mod key_patterns {
    pub fn snapshot(chain: &str, token: &str) -> String {
        format!(
            "snapshot:{}:{}",
            chain.to_ascii_lowercase(),
            token.to_ascii_lowercase()
        )
    }

    pub fn candles(token: &str) -> String {
        format!("candles:{}", token.to_ascii_lowercase())
    }
}

/// A raw cache row as read from SQLite.
#[derive(Debug, Clone)]
pub struct CacheRow {
    pub key: String,
    pub category: String,
    pub value_json: String,
    pub source: String,
    pub symbol: Option<String>,
    pub created_at: String,
    pub expires_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_pattern_snapshot() {
        assert_eq!(
            key_patterns::snapshot("Solana", "BONK"),
            "snapshot:solana:bonk"
        );
    }

    #[test]
    fn key_pattern_candles() {
        assert_eq!(key_patterns::candles("dogwifcoin"), "candles:dogwifcoin");
    }

    #[test]
    fn category_labels_match_serde() {
        for cat in [CacheCategory::Snapshot, CacheCategory::Candles] {
            let json = serde_json::to_string(&cat).unwrap();
            assert_eq!(json, format!("\"{}\"", cat.as_str()));
        }
    }
}
