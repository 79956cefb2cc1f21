//! Pluggable backend trait for rate limit reset storage.
//!
//! Allows swapping between in-memory (single process) and SQLite
//! (survives restarts) storage of per-action reset timestamps.

use async_trait::async_trait;

/// Result type for rate limit operations.
pub type RateLimitResult<T> = Result<T, RateLimitError>;

/// Errors from rate limit backend operations.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for RateLimitError {
    fn from(e: rusqlite::Error) -> Self {
        RateLimitError::Database(e.to_string())
    }
}

/// Throttle window recorded for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub action: String,
    /// Unix timestamp ms after which the record is stale.
    pub reset_at_ms: i64,
}

impl RateLimitRecord {
    pub fn new(action: impl Into<String>, reset_at_ms: i64) -> Self {
        Self {
            action: action.into(),
            reset_at_ms,
        }
    }

    /// A record whose reset instant has been reached counts as absent.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.reset_at_ms
    }
}

/// Trait for rate limit storage backends.
///
/// Implementations must be thread-safe and handle concurrent access.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Load the record for an action, expired or not.
    async fn get(&self, action: &str) -> RateLimitResult<Option<RateLimitRecord>>;

    /// Insert or replace the record for `record.action`.
    async fn put(&self, record: &RateLimitRecord) -> RateLimitResult<()>;

    /// Remove the record for an action. Missing records are not an error.
    async fn delete(&self, action: &str) -> RateLimitResult<()>;

    /// All stored records, ordered by action name.
    async fn list(&self) -> RateLimitResult<Vec<RateLimitRecord>>;
}
