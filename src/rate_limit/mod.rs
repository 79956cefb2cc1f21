//! Client-side rate limit gate.
//!
//! Tracks, per action name, whether the server has told us to back off.
//! Each action moves between two states:
//! - Idle: no record, or the stored reset instant has passed
//! - Throttled: a reset instant in the future is stored
//!
//! Arming the gate persists the reset instant and schedules a one-shot
//! release task on the runtime. The task clears the record and notifies
//! registered listeners so forms can re-enable themselves without any
//! further user interaction. Reads also expire stale records lazily.

mod backend;
mod clock;
mod memory;
mod sqlite;

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub use backend::{RateLimitError, RateLimitRecord, RateLimitResult, RateLimitStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use memory::InMemoryRateLimitStore;
pub use sqlite::SqliteRateLimitStore;

/// Shared handle to a storage backend.
pub type BoxedRateLimitStore = Arc<dyn RateLimitStore>;

/// Create the store named by a backend setting.
///
/// `None` and `"sqlite"` use the database file, `"memory"` keeps state
/// for the lifetime of the process only.
pub fn create_store(backend: Option<&str>, db_path: &Path) -> RateLimitResult<BoxedRateLimitStore> {
    match backend.unwrap_or("sqlite") {
        "memory" => Ok(Arc::new(InMemoryRateLimitStore::new())),
        "sqlite" => Ok(Arc::new(SqliteRateLimitStore::open(db_path)?)),
        other => Err(RateLimitError::Unavailable(format!(
            "unknown rate limit backend '{}'",
            other
        ))),
    }
}

/// Gate state for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Throttled { reset_at_ms: i64 },
}

impl GateState {
    pub fn is_throttled(&self) -> bool {
        matches!(self, GateState::Throttled { .. })
    }

    pub fn reset_at_ms(&self) -> Option<i64> {
        match self {
            GateState::Idle => None,
            GateState::Throttled { reset_at_ms } => Some(*reset_at_ms),
        }
    }
}

/// Receives gate transitions for the actions it is registered on.
pub trait GateListener: Send + Sync {
    /// A persisted window was found live at startup. `now_ms` is the gate's
    /// clock reading.
    fn on_restored(&self, _action: &str, _reset_at_ms: i64, _now_ms: i64) {}

    /// The scheduled release fired and the record was cleared.
    fn on_release(&self, action: &str);
}

struct ScheduledRelease {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Per-action throttle gate with timer-driven release.
#[derive(Clone)]
pub struct RateLimitGate {
    store: BoxedRateLimitStore,
    clock: Arc<dyn Clock>,
    listeners: Arc<RwLock<HashMap<String, Vec<Arc<dyn GateListener>>>>>,
    timers: Arc<Mutex<HashMap<String, ScheduledRelease>>>,
    next_generation: Arc<AtomicU64>,
}

impl RateLimitGate {
    /// Create a gate over a store using the system clock.
    pub fn new(store: BoxedRateLimitStore) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Create a gate with a custom clock.
    pub fn with_clock(store: BoxedRateLimitStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            listeners: Arc::new(RwLock::new(HashMap::new())),
            timers: Arc::new(Mutex::new(HashMap::new())),
            next_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Reset instant of a window starting now, clamped to the largest timestamp.
    pub fn reset_after(&self, window: Duration) -> i64 {
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        self.clock.now_ms().saturating_add(window_ms)
    }

    /// Register a listener for one action's transitions.
    pub async fn register(&self, action: &str, listener: Arc<dyn GateListener>) {
        let mut listeners = self.listeners.write().await;
        listeners
            .entry(action.to_string())
            .or_default()
            .push(listener);
    }

    /// Read the gate for an action, clearing a stale record on the way.
    pub async fn check(&self, action: &str) -> RateLimitResult<GateState> {
        let Some(record) = self.store.get(action).await? else {
            return Ok(GateState::Idle);
        };

        if record.is_expired(self.clock.now_ms()) {
            self.expire(action).await?;
            return Ok(GateState::Idle);
        }

        Ok(GateState::Throttled {
            reset_at_ms: record.reset_at_ms,
        })
    }

    /// Whether an action is currently throttled.
    pub async fn is_throttled(&self, action: &str) -> RateLimitResult<bool> {
        Ok(self.check(action).await?.is_throttled())
    }

    /// Throttle an action for `window` starting now.
    ///
    /// The release timer is scheduled before the record is persisted, so a
    /// storage failure still ends the lock in this process. Returns the
    /// reset instant.
    pub async fn arm(&self, action: &str, window: Duration) -> RateLimitResult<i64> {
        let reset_at_ms = self.reset_after(window);
        self.schedule_release(action, reset_at_ms).await;
        self.store
            .put(&RateLimitRecord::new(action, reset_at_ms))
            .await?;

        info!(
            "Action {} throttled for {:?} (until {})",
            action, window, reset_at_ms
        );
        Ok(reset_at_ms)
    }

    /// Remove an action's record and cancel its pending release.
    pub async fn clear(&self, action: &str) -> RateLimitResult<()> {
        if let Some(scheduled) = self.timers.lock().await.remove(action) {
            scheduled.handle.abort();
        }
        self.store.delete(action).await?;
        debug!("Cleared rate limit for {}", action);
        Ok(())
    }

    /// Whether a release task is waiting for this action.
    pub async fn has_pending_release(&self, action: &str) -> bool {
        self.timers.lock().await.contains_key(action)
    }

    /// Snapshot of every live window, expiring stale ones.
    pub async fn states(&self) -> RateLimitResult<Vec<RateLimitRecord>> {
        let now_ms = self.clock.now_ms();
        let mut live = Vec::new();
        for record in self.store.list().await? {
            if record.is_expired(now_ms) {
                self.expire(&record.action).await?;
            } else {
                live.push(record);
            }
        }
        Ok(live)
    }

    /// Re-schedule release timers for windows persisted by an earlier run.
    ///
    /// Returns how many actions are still throttled.
    pub async fn restore(&self) -> RateLimitResult<usize> {
        let live = self.states().await?;
        let now_ms = self.clock.now_ms();

        for record in &live {
            self.schedule_release(&record.action, record.reset_at_ms)
                .await;

            let listeners = self.listeners_for(&record.action).await;
            for listener in listeners {
                listener.on_restored(&record.action, record.reset_at_ms, now_ms);
            }
            info!(
                "Restored rate limit for {}: reset at {}",
                record.action, record.reset_at_ms
            );
        }

        Ok(live.len())
    }

    /// Drop a record found stale on read, cancel its release task and
    /// notify listeners in its place.
    async fn expire(&self, action: &str) -> RateLimitResult<()> {
        debug!("Rate limit record for {} expired, clearing", action);
        if let Some(scheduled) = self.timers.lock().await.remove(action) {
            scheduled.handle.abort();
        }
        self.store.delete(action).await?;

        info!("Rate limit window for {} elapsed", action);
        for listener in self.listeners_for(action).await {
            listener.on_release(action);
        }
        Ok(())
    }

    async fn listeners_for(&self, action: &str) -> Vec<Arc<dyn GateListener>> {
        let listeners = self.listeners.read().await;
        listeners.get(action).cloned().unwrap_or_default()
    }

    async fn schedule_release(&self, action: &str, reset_at_ms: i64) {
        let delay_ms = (reset_at_ms - self.clock.now_ms()).max(0) as u64;
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        // Hold the lock across spawn so a zero-delay task sees its own entry.
        let mut timers = self.timers.lock().await;
        let gate = self.clone();
        let owned_action = action.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            gate.release(&owned_action, generation, reset_at_ms).await;
        });

        if let Some(previous) = timers.insert(
            action.to_string(),
            ScheduledRelease { generation, handle },
        ) {
            previous.handle.abort();
        }
    }

    async fn release(&self, action: &str, generation: u64, reset_at_ms: i64) {
        {
            let mut timers = self.timers.lock().await;
            match timers.get(action) {
                Some(scheduled) if scheduled.generation == generation => {
                    timers.remove(action);
                }
                _ => return,
            }
        }

        match self.store.get(action).await {
            Ok(Some(record)) if record.reset_at_ms > reset_at_ms => {
                debug!("Newer rate limit window for {}, keeping it", action);
                return;
            }
            Ok(Some(_)) => {
                if let Err(e) = self.store.delete(action).await {
                    warn!("Failed to clear rate limit record for {}: {}", action, e);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to read rate limit record for {}: {}", action, e),
        }

        info!("Rate limit window for {} elapsed", action);
        for listener in self.listeners_for(action).await {
            listener.on_release(action);
        }
    }
}
