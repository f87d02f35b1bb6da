pub mod sqlite;

use async_trait::async_trait;
use crate::error::Result;

pub use sqlite::SqliteCache;

/// Trait for upstream response caches.
///
/// Keys are full upstream request URLs; values are raw response bodies.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Get a live (non-expired) cached body
    async fn get(&self, key: &str) -> Result<Option<CachedResponse>>;

    /// Save a body, keeping the existing hit count
    async fn save(&self, key: &str, body: &str) -> Result<()>;

    /// Increment cache hit counter
    async fn increment_hit(&self, key: &str) -> Result<()>;

    /// Drop one entry; returns whether it existed
    async fn invalidate(&self, key: &str) -> Result<bool>;

    /// Get cache statistics
    async fn stats(&self) -> Result<CacheStats>;

    /// Clear entries older than `max_age_hours`
    async fn cleanup(&self, max_age_hours: i64) -> Result<u64>;
}

/// Cached response with metadata
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub key: String,
    pub body: String,
    pub hit_count: i64,
    pub cached_at: chrono::DateTime<chrono::Utc>,
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_entries: u64,
    pub total_hits: u64,
    pub avg_hit_count: f64,
    pub oldest_entry: Option<chrono::DateTime<chrono::Utc>>,
    pub newest_entry: Option<chrono::DateTime<chrono::Utc>>,
}
