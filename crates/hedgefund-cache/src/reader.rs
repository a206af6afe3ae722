use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hedgefund_models::cache_schema::key_patterns;
use hedgefund_models::market::{Candle, Snapshot};
use moka::future::Cache;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::CacheError;
use crate::source::{CandleSource, SnapshotSource};
use crate::sqlite::SqliteReader;

/// Read-through market-data cache: moka (hot, typed) → SQLite (shared) → None.
///
/// SQLite hits are decoded once and promoted to the hot cache. The database is
/// written by an external pipeline; this type never writes to it.
///
/// SQLite access is synchronized via `Mutex` since `rusqlite::Connection` is not `Sync`.
pub struct CacheReader {
    snapshots: Cache<String, Snapshot>,
    candles: Cache<String, Arc<Vec<Candle>>>,
    sqlite: Mutex<SqliteReader>,
}

impl CacheReader {
    pub fn new(sqlite: SqliteReader, max_capacity: u64, memory_ttl: Duration) -> Self {
        Self {
            snapshots: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(memory_ttl)
                .build(),
            candles: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(memory_ttl)
                .build(),
            sqlite: Mutex::new(sqlite),
        }
    }

    /// Decode the live SQLite row stored under `key`.
    fn read_row<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let row = {
            let sqlite = self
                .sqlite
                .lock()
                .map_err(|e| CacheError::Unavailable(format!("SQLite mutex poisoned: {e}")))?;
            sqlite.get(key)?
        };

        row.map(|row| {
            serde_json::from_str(&row.value_json).map_err(|source| CacheError::Json {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
    }

    /// Number of entries currently held in the hot caches.
    pub fn hot_cache_size(&self) -> u64 {
        self.snapshots.entry_count() + self.candles.entry_count()
    }
}

#[async_trait]
impl SnapshotSource for CacheReader {
    async fn get_snapshot(&self, token: &str, chain: &str) -> Result<Option<Snapshot>, CacheError> {
        let key = key_patterns::snapshot(chain, token);
        if let Some(snapshot) = self.snapshots.get(&key).await {
            return Ok(Some(snapshot));
        }

        let Some(mut snapshot) = self.read_row::<Snapshot>(&key)? else {
            debug!(key = %key, "Snapshot cache miss");
            return Ok(None);
        };

        if snapshot.token.is_empty() {
            snapshot.token = token.to_string();
        }
        if snapshot.chain.is_empty() {
            snapshot.chain = chain.to_string();
        }

        self.snapshots.insert(key, snapshot.clone()).await;
        Ok(Some(snapshot))
    }
}

#[async_trait]
impl CandleSource for CacheReader {
    async fn fetch_candles(&self, token_id: &str, days: u32) -> Result<Vec<Candle>, CacheError> {
        let key = key_patterns::candles(token_id);
        let series = match self.candles.get(&key).await {
            Some(series) => series,
            None => {
                let Some(mut candles) = self.read_row::<Vec<Candle>>(&key)? else {
                    debug!(key = %key, "Candle cache miss");
                    return Ok(Vec::new());
                };
                candles.sort_by_key(|c| c.timestamp);
                candles.dedup_by_key(|c| c.timestamp);
                let series = Arc::new(candles);
                self.candles.insert(key, Arc::clone(&series)).await;
                series
            }
        };

        let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
        Ok(series
            .iter()
            .filter(|c| c.timestamp >= cutoff)
            .cloned()
            .collect())
    }
}
