//! SQLite-backed rate limit store.
//!
//! Keeps reset timestamps in the local data directory so a throttle window
//! survives restarts of the client.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::backend::{RateLimitError, RateLimitRecord, RateLimitResult, RateLimitStore};

/// Open a database connection with proper concurrency settings.
fn open_db(db_path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 30000;
    "#,
    )?;
    Ok(conn)
}

/// Initialize the rate limit table in the database.
pub fn init_rate_limit_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS rate_limit_reset (
            action TEXT PRIMARY KEY,
            reset_at_ms INTEGER NOT NULL,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#,
    )?;
    Ok(())
}

/// SQLite rate limit storage.
#[derive(Clone)]
pub struct SqliteRateLimitStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRateLimitStore {
    /// Open (creating if needed) the store at `db_path`.
    pub fn open(db_path: &Path) -> RateLimitResult<Self> {
        let conn = open_db(db_path)?;
        init_rate_limit_table(&conn)?;
        debug!("Opened rate limit store at {}", db_path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> RateLimitResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RateLimitError::Unavailable("connection lock poisoned".to_string()))
    }
}

#[async_trait]
impl RateLimitStore for SqliteRateLimitStore {
    async fn get(&self, action: &str) -> RateLimitResult<Option<RateLimitRecord>> {
        let conn = self.conn()?;
        let reset_at_ms: Option<i64> = conn
            .query_row(
                "SELECT reset_at_ms FROM rate_limit_reset WHERE action = ?1",
                params![action],
                |row| row.get(0),
            )
            .optional()?;
        Ok(reset_at_ms.map(|ms| RateLimitRecord::new(action, ms)))
    }

    async fn put(&self, record: &RateLimitRecord) -> RateLimitResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"INSERT OR REPLACE INTO rate_limit_reset (action, reset_at_ms, updated_at)
               VALUES (?1, ?2, CURRENT_TIMESTAMP)"#,
            params![record.action, record.reset_at_ms],
        )?;
        Ok(())
    }

    async fn delete(&self, action: &str) -> RateLimitResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM rate_limit_reset WHERE action = ?1",
            params![action],
        )?;
        Ok(())
    }

    async fn list(&self) -> RateLimitResult<Vec<RateLimitRecord>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT action, reset_at_ms FROM rate_limit_reset ORDER BY action")?;
        let rows = stmt.query_map([], |row| {
            Ok(RateLimitRecord::new(
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}
