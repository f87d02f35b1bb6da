use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::cache::{CacheStats, CachedResponse, ResponseCache};
use crate::error::{ReconcileError, Result};

/// SQLite-backed response cache with an optional time-to-live.
///
/// Schema:
/// ```sql
/// CREATE TABLE response_cache (
///     key TEXT PRIMARY KEY,
///     body TEXT NOT NULL,
///     hit_count INTEGER DEFAULT 0,
///     cached_at TEXT NOT NULL
/// );
/// ```
///
/// `cached_at` is RFC 3339 UTC with fixed microsecond precision, so string
/// comparison orders rows by time.
pub struct SqliteCache {
    conn: Arc<Mutex<Connection>>,
    ttl: Option<Duration>,
}

impl SqliteCache {
    /// Open (or create) a cache. Entries older than `ttl` are ignored by `get`;
    /// `None` keeps entries until cleaned up or invalidated.
    pub async fn new(db_path: &str, ttl: Option<Duration>) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS response_cache (
                key TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                hit_count INTEGER DEFAULT 0,
                cached_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_cached_at ON response_cache(cached_at)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            ttl,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ReconcileError::Cache("connection mutex poisoned".to_string()))
    }

    fn timestamp(at: DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn is_expired(&self, cached_at: DateTime<Utc>) -> bool {
        match self.ttl {
            Some(ttl) => Utc::now() - cached_at >= ttl,
            None => false,
        }
    }

    fn boundary(conn: &Connection, sql: &str) -> Option<DateTime<Utc>> {
        conn.query_row(sql, [], |row| row.get::<_, Option<String>>(0))
            .ok()
            .flatten()
            .and_then(|s| Self::parse_timestamp(&s))
    }
}

#[async_trait]
impl ResponseCache for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<CachedResponse>> {
        let conn = self.conn()?;

        let row = conn
            .query_row(
                "SELECT body, hit_count, cached_at FROM response_cache WHERE key = ?",
                params![key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((body, hit_count, cached_at)) = row else {
            return Ok(None);
        };

        // an unreadable timestamp is treated as stale
        let Some(cached_at) = Self::parse_timestamp(&cached_at) else {
            return Ok(None);
        };

        if self.is_expired(cached_at) {
            return Ok(None);
        }

        Ok(Some(CachedResponse {
            key: key.to_string(),
            body,
            hit_count,
            cached_at,
        }))
    }

    async fn save(&self, key: &str, body: &str) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT OR REPLACE INTO response_cache (key, body, hit_count, cached_at)
             VALUES (?1, ?2, COALESCE((SELECT hit_count FROM response_cache WHERE key = ?1), 0), ?3)",
            params![key, body, Self::timestamp(Utc::now())],
        )?;

        Ok(())
    }

    async fn increment_hit(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "UPDATE response_cache SET hit_count = hit_count + 1 WHERE key = ?",
            params![key],
        )?;

        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<bool> {
        let conn = self.conn()?;

        let deleted = conn.execute("DELETE FROM response_cache WHERE key = ?", params![key])?;

        Ok(deleted > 0)
    }

    async fn stats(&self) -> Result<CacheStats> {
        let conn = self.conn()?;

        let total_entries: u64 =
            conn.query_row("SELECT COUNT(*) FROM response_cache", [], |row| row.get(0))?;

        let total_hits: u64 = conn.query_row(
            "SELECT COALESCE(SUM(hit_count), 0) FROM response_cache",
            [],
            |row| row.get(0),
        )?;

        let avg_hit_count = if total_entries > 0 {
            total_hits as f64 / total_entries as f64
        } else {
            0.0
        };

        Ok(CacheStats {
            total_entries,
            total_hits,
            avg_hit_count,
            oldest_entry: Self::boundary(&conn, "SELECT MIN(cached_at) FROM response_cache"),
            newest_entry: Self::boundary(&conn, "SELECT MAX(cached_at) FROM response_cache"),
        })
    }

    async fn cleanup(&self, max_age_hours: i64) -> Result<u64> {
        let conn = self.conn()?;

        let cutoff = Utc::now() - Duration::hours(max_age_hours);

        let deleted = conn.execute(
            "DELETE FROM response_cache WHERE cached_at <= ?",
            params![Self::timestamp(cutoff)],
        )?;

        Ok(deleted as u64)
    }
}
