//! In-memory rate limit backend for single-process operation.
//!
//! State is not persisted across restarts.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::backend::{RateLimitRecord, RateLimitResult, RateLimitStore};

/// In-memory rate limit backend.
#[derive(Clone, Default)]
pub struct InMemoryRateLimitStore {
    resets: Arc<RwLock<HashMap<String, i64>>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn get(&self, action: &str) -> RateLimitResult<Option<RateLimitRecord>> {
        let resets = self.resets.read().await;
        Ok(resets
            .get(action)
            .map(|reset_at_ms| RateLimitRecord::new(action, *reset_at_ms)))
    }

    async fn put(&self, record: &RateLimitRecord) -> RateLimitResult<()> {
        let mut resets = self.resets.write().await;
        resets.insert(record.action.clone(), record.reset_at_ms);
        Ok(())
    }

    async fn delete(&self, action: &str) -> RateLimitResult<()> {
        let mut resets = self.resets.write().await;
        resets.remove(action);
        Ok(())
    }

    async fn list(&self) -> RateLimitResult<Vec<RateLimitRecord>> {
        let resets = self.resets.read().await;
        let mut records: Vec<RateLimitRecord> = resets
            .iter()
            .map(|(action, reset_at_ms)| RateLimitRecord::new(action.clone(), *reset_at_ms))
            .collect();
        records.sort_by(|a, b| a.action.cmp(&b.action));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = InMemoryRateLimitStore::new();
        assert_eq!(store.get("chart").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_replaces_existing() {
        let store = InMemoryRateLimitStore::new();
        store.put(&RateLimitRecord::new("chart", 100)).await.unwrap();
        store.put(&RateLimitRecord::new("chart", 200)).await.unwrap();

        let record = store.get("chart").await.unwrap().unwrap();
        assert_eq!(record.reset_at_ms, 200);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_per_action() {
        let store = InMemoryRateLimitStore::new();
        store.put(&RateLimitRecord::new("chart", 100)).await.unwrap();
        store
            .put(&RateLimitRecord::new("earnings", 100))
            .await
            .unwrap();

        store.delete("earnings").await.unwrap();
        store.delete("never-stored").await.unwrap();

        let actions: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.action)
            .collect();
        assert_eq!(actions, vec!["chart".to_string()]);
    }
}
