//! Persistent response cache backed by SQLite.
//!
//! Repeated runs against the same site read pages from the cache instead of
//! downloading them again. Keys are absolute URLs, values the raw bodies.

use crate::error::{MirrorError, Result};
use rusqlite::Connection;
use std::path::Path;

/// Single-table key/value store in one database file.
pub struct PageCache {
    db: Connection,
}

impl PageCache {
    /// Open or create the cache at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Connection::open(path).map_err(|e| {
            MirrorError::Cache(format!("failed to open cache '{}': {e}", path.display()))
        })?;

        db.execute_batch(
            "CREATE TABLE IF NOT EXISTS cache (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL
            );",
        )?;

        Ok(Self { db })
    }

    /// Cached body for `key`.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let result = self.db.query_row(
            "SELECT value FROM cache WHERE key = ?1",
            rusqlite::params![key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.db.execute(
            "INSERT OR REPLACE INTO cache (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    /// Number of cached entries.
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .db
            .query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Close the database, reporting any error on the way out.
    pub fn close(self) -> Result<()> {
        self.db.close().map_err(|(_, e)| e.into())
    }
}
