//! Key/value cache with per-entry expiration.
//!
//! Values are stored as JSON so one store can hold verification codes and
//! activity lists alike. Keys are namespaced through the helpers at the bottom
//! of this module; callers should never build raw keys themselves.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::models::ActivityType;

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the live value under `key`, if any.
    async fn get(&self, key: &str) -> Option<Value>;
    /// Stores `value`, replacing any previous entry, for `ttl`.
    async fn set(&self, key: &str, value: Value, ttl: Duration);
    /// Removes the entry; returns whether a live one existed.
    async fn delete(&self, key: &str) -> bool;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Process-local cache. Expired entries are purged lazily on access.
#[derive(Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop it unless a concurrent set already replaced it.
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(key);
        }
        None
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    async fn delete(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .write()
            .await
            .remove(key)
            .is_some_and(|entry| entry.is_live(now))
    }
}

/// Reads a typed value. An entry that no longer deserializes is treated as
/// absent.
pub async fn get_json<T: DeserializeOwned>(cache: &dyn CacheStore, key: &str) -> Option<T> {
    let value = cache.get(key).await?;
    match serde_json::from_value(value) {
        Ok(typed) => Some(typed),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding undecodable cache entry");
            None
        }
    }
}

pub async fn set_json<T: Serialize + ?Sized>(
    cache: &dyn CacheStore,
    key: &str,
    value: &T,
    ttl: Duration,
) -> Result<(), serde_json::Error> {
    let value = serde_json::to_value(value)?;
    cache.set(key, value, ttl).await;
    Ok(())
}

pub fn verification_key(email: &str) -> String {
    format!("verify:{}", email)
}

pub fn best_key(act_type: ActivityType) -> String {
    format!("best:{}", act_type.as_str())
}

pub fn recommendations_key(email: &str) -> String {
    format!("recs:{}", email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = InMemoryCache::new();
        cache
            .set("k", json!("v"), Duration::from_secs(300))
            .await;

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get("k").await, Some(json!("v")));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("k").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_overwrites_and_restarts_ttl() {
        let cache = InMemoryCache::new();
        cache.set("k", json!(1), Duration::from_secs(10)).await;
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set("k", json!(2), Duration::from_secs(10)).await;
        tokio::time::advance(Duration::from_secs(8)).await;

        assert_eq!(cache.get("k").await, Some(json!(2)));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_reports_live_entries_only() {
        let cache = InMemoryCache::new();
        assert!(!cache.delete("missing").await);

        cache.set("k", json!(true), Duration::from_secs(60)).await;
        assert!(cache.delete("k").await);
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_typed_helpers() {
        let cache = InMemoryCache::new();
        set_json(&cache, "list", &vec![1, 2, 3], Duration::from_secs(60))
            .await
            .expect("serializable");

        let list: Option<Vec<i32>> = get_json(&cache, "list").await;
        assert_eq!(list, Some(vec![1, 2, 3]));

        let wrong: Option<String> = get_json(&cache, "list").await;
        assert_eq!(wrong, None);
    }

    #[test]
    fn test_key_namespaces_do_not_collide() {
        assert_ne!(verification_key("a@x.com"), recommendations_key("a@x.com"));
        assert_eq!(best_key(ActivityType::Club), "best:club");
    }
}
