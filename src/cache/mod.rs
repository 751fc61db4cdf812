//! Expiring key-value backends used for sessions and rate limiting.
//!
//! Two implementations share one trait:
//! - [`redis::RedisStore`] for deployed environments
//! - [`memory::MemoryStore`] for tests and local runs without Redis

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use std::time::Duration;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Errors raised by a key-value backend.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Command error: {0}")]
    Command(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Operations the session store and rate limiter need from the backing store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a string value; `None` when absent or expired.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Write a value with an absolute time-to-live, replacing any previous value.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Reset the time-to-live of an existing key. Returns false if the key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool>;

    /// Remove a key. Absent keys are not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Check whether a key is present without touching its time-to-live.
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Record one event in a time-ordered window as a single atomic step:
    /// drop entries scored at or below `now - window`, count what is left,
    /// add `now`, then set the key's time-to-live to `window`.
    ///
    /// Returns the count taken before `now` was added.
    async fn record_in_window(&self, key: &str, now: f64, window: Duration) -> CacheResult<u64>;

    /// Connectivity check used by the readiness endpoint.
    async fn ping(&self) -> CacheResult<()>;
}

/// Member name for a window entry. Microsecond precision keeps requests that
/// land in the same second distinct.
pub(crate) fn window_member(now: f64) -> String {
    format!("{:.6}", now)
}
