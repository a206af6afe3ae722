use chrono::{Duration, Utc};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use hedgefund_models::cache_schema::{CacheCategory, CacheRow, CACHE_TABLE_DDL};

use crate::error::CacheError;

const SELECT_COLUMNS: &str =
    "key, category, value_json, source, symbol, created_at, expires_at, updated_at";

/// SQLite accessor for the shared market-data cache.
///
/// The database is written by an external market-data pipeline; production
/// code opens it read-only. The in-memory variant is writable so tests can seed it.
pub struct SqliteReader {
    conn: Connection,
}

impl SqliteReader {
    /// Open a read-only connection to the shared cache database.
    pub fn open(path: &str) -> Result<Self, CacheError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database with the schema already created.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CACHE_TABLE_DDL)?;
        Ok(Self { conn })
    }

    /// Fetch a live (non-expired) row by key.
    pub fn get(&self, key: &str) -> Result<Option<CacheRow>, CacheError> {
        let now = Utc::now().to_rfc3339();
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {SELECT_COLUMNS} FROM cache_entries WHERE key = ?1 AND expires_at > ?2"
        ))?;

        let row = stmt
            .query_row(rusqlite::params![key, now], |row| {
                Ok(CacheRow {
                    key: row.get(0)?,
                    category: row.get(1)?,
                    value_json: row.get(2)?,
                    source: row.get(3)?,
                    symbol: row.get(4)?,
                    created_at: row.get(5)?,
                    expires_at: row.get(6)?,
                    updated_at: row.get(7)?,
                })
            })
            .optional()?;

        Ok(row)
    }

    /// Insert or replace a row.
    pub fn insert(&self, row: &CacheRow) -> Result<(), CacheError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO cache_entries \
             (key, category, value_json, source, symbol, created_at, expires_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                row.key,
                row.category,
                row.value_json,
                row.source,
                row.symbol,
                row.created_at,
                row.expires_at,
                row.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Serialize `value` and store it under `key` for `ttl`.
    pub fn put_json<T: serde::Serialize>(
        &self,
        key: &str,
        category: CacheCategory,
        symbol: Option<&str>,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let value_json = serde_json::to_string(value).map_err(|source| CacheError::Json {
            key: key.to_string(),
            source,
        })?;
        let now = Utc::now();
        self.insert(&CacheRow {
            key: key.to_string(),
            category: category.as_str().to_string(),
            value_json,
            source: "local".to_string(),
            symbol: symbol.map(str::to_string),
            created_at: now.to_rfc3339(),
            expires_at: (now + ttl).to_rfc3339(),
            updated_at: now.to_rfc3339(),
        })
    }
}
