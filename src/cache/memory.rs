//! In-process key-value store with the same semantics as the Redis backend.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::{CacheResult, KeyValueStore, window_member};

#[derive(Debug, Clone)]
enum Value {
    Text(String),
    /// member -> score
    Window(BTreeMap<String, f64>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Memory store. All operations take one lock, so `record_in_window` is atomic.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries in a window key (test helper).
    pub async fn window_len(&self, key: &str) -> usize {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        match entries.get(key) {
            Some(Entry {
                value: Value::Window(set),
                expires_at,
            }) if *expires_at > now => set.len(),
            _ => 0,
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(Entry {
                value: Value::Text(text),
                ..
            }) => Ok(Some(text.clone())),
            _ => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: Value::Text(value.to_string()),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.expires_at = now + ttl;
                Ok(true)
            }
            Some(_) => {
                entries.remove(key);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        Ok(entries.get(key).is_some_and(|entry| !entry.is_expired(now)))
    }

    async fn record_in_window(&self, key: &str, now: f64, window: Duration) -> CacheResult<u64> {
        let clock = Instant::now();
        let cutoff = now - window.as_secs_f64();
        let mut entries = self.entries.lock().await;

        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry {
                value: Value::Window(BTreeMap::new()),
                expires_at: clock + window,
            });

        if entry.is_expired(clock) || !matches!(entry.value, Value::Window(_)) {
            entry.value = Value::Window(BTreeMap::new());
        }

        let Value::Window(set) = &mut entry.value else {
            unreachable!("window entry was just normalized");
        };

        set.retain(|_, score| *score > cutoff);
        let count = set.len() as u64;
        set.insert(window_member(now), now);
        entry.expires_at = clock + window;

        Ok(count)
    }

    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }
}
