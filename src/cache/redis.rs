//! Redis-backed key-value store.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{CacheError, CacheResult, KeyValueStore, window_member};

/// Redis store sharing one multiplexed connection across requests.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
    connection: Arc<Mutex<Option<MultiplexedConnection>>>,
}

impl RedisStore {
    /// Create a store from a `redis://` URL. The connection is opened lazily.
    pub fn new(redis_url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("Redis client error: {}", e)))?;

        Ok(Self {
            client,
            connection: Arc::new(Mutex::new(None)),
        })
    }

    /// Get a working connection, reusing the shared one when present.
    async fn get_connection(&self) -> CacheResult<MultiplexedConnection> {
        let mut guard = self.connection.lock().await;

        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Connection(format!("Connection failed: {}", e)))?;

        *guard = Some(conn.clone());
        Ok(conn)
    }

    /// Drop the shared connection so the next call reconnects.
    async fn reset_connection(&self) {
        *self.connection.lock().await = None;
    }

    async fn command_failed(&self, err: redis::RedisError) -> CacheError {
        if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
            self.reset_connection().await;
            CacheError::Connection(err.to_string())
        } else {
            CacheError::Command(err.to_string())
        }
    }
}

fn millis(ttl: Duration) -> u64 {
    ttl.as_millis().max(1) as u64
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.get_connection().await?;
        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => Ok(value),
            Err(e) => Err(self.command_failed(e).await),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.get_connection().await?;
        match conn.pset_ex::<_, _, ()>(key, value, millis(ttl)).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.command_failed(e).await),
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        let mut conn = self.get_connection().await?;
        match conn.pexpire::<_, bool>(key, millis(ttl) as i64).await {
            Ok(updated) => Ok(updated),
            Err(e) => Err(self.command_failed(e).await),
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.get_connection().await?;
        match conn.del::<_, ()>(key).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.command_failed(e).await),
        }
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.get_connection().await?;
        match conn.exists::<_, bool>(key).await {
            Ok(found) => Ok(found),
            Err(e) => Err(self.command_failed(e).await),
        }
    }

    async fn record_in_window(&self, key: &str, now: f64, window: Duration) -> CacheResult<u64> {
        let mut conn = self.get_connection().await?;
        let cutoff = now - window.as_secs_f64();

        // MULTI/EXEC: purge, count, add and expire run as one unit.
        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("ZREMRANGEBYSCORE")
            .arg(key)
            .arg("-inf")
            .arg(cutoff)
            .ignore()
            .cmd("ZCARD")
            .arg(key)
            .cmd("ZADD")
            .arg(key)
            .arg(now)
            .arg(window_member(now))
            .ignore()
            .cmd("PEXPIRE")
            .arg(key)
            .arg(millis(window))
            .ignore();

        match pipe.query_async::<(u64,)>(&mut conn).await {
            Ok((count,)) => Ok(count),
            Err(e) => Err(self.command_failed(e).await),
        }
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.get_connection().await?;
        match redis::cmd("PING").query_async::<String>(&mut conn).await {
            Ok(_) => Ok(()),
            Err(e) => Err(self.command_failed(e).await),
        }
    }
}
