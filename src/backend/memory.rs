//! In-process backend for the single-node variant.
//!
//! Values live in one RwLock-guarded map; the exclusive-acquire primitive
//! degenerates to a per-key deadline that is checked, and pruned, whenever
//! a new acquire comes in. Nothing here survives the process.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::sync::RwLock;

use super::CoordinationBackend;
use crate::error::BackendError;

/// Local in-memory backend. Deduplication scope: this one process.
#[derive(Default)]
pub struct MemoryBackend {
    values: RwLock<HashMap<String, String>>,
    locks: Mutex<HashMap<String, Instant>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CoordinationBackend for MemoryBackend {
    async fn put_if_absent(&self, key: &str, value: &str) -> Result<bool, BackendError> {
        let mut values = self.values.write().await;
        match values.entry(key.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(value.to_string());
                Ok(true)
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.values.write().await.remove(key))
    }

    async fn try_lock(&self, key: &str, ttl: Duration) -> Result<bool, BackendError> {
        let now = Instant::now();
        let mut locks = self.locks.lock().await;
        locks.retain(|_, deadline| *deadline > now);
        match locks.entry(key.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(now + ttl);
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_if_absent_keeps_the_first_value() {
        let backend = MemoryBackend::new();
        assert!(backend.put_if_absent("k", "first").await.unwrap());
        assert!(!backend.put_if_absent("k", "second").await.unwrap());
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn take_consumes_the_value() {
        let backend = MemoryBackend::new();
        backend.put_if_absent("k", "v").await.unwrap();
        assert_eq!(backend.take("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(backend.take("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_locks_are_reclaimable() {
        let backend = MemoryBackend::new();
        let ttl = Duration::from_millis(30);
        assert!(backend.try_lock("k", ttl).await.unwrap());
        assert!(!backend.try_lock("k", ttl).await.unwrap());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(backend.try_lock("k", ttl).await.unwrap());
    }

    #[tokio::test]
    async fn locks_and_values_are_separate_namespaces() {
        let backend = MemoryBackend::new();
        backend.put_if_absent("k", "v").await.unwrap();
        assert!(backend.try_lock("k", Duration::from_secs(10)).await.unwrap());
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
