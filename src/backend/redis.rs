//! Shared backend for the multi-node variant, backed by Redis.
//!
//! Stopwatch values live in one hash so the whole fleet shares a single
//! associative table. The get-and-delete primitive is a Lua script: an
//! HGET/HDEL pair issued separately would reopen the stop/stop race the
//! store exists to close. Locks are plain `SET NX PX` keys with
//! store-native expiry.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Script;
use tracing::debug;

use super::CoordinationBackend;
use crate::error::BackendError;

/// Hash holding one field per stopwatch owner.
const VALUES_HASH: &str = "tickline:stopwatch";
/// Namespace for event-lock keys.
const LOCK_PREFIX: &str = "tickline:msglock:";

/// Atomic HGET + HDEL of one hash field.
const TAKE_SCRIPT: &str = r"
local v = redis.call('HGET', KEYS[1], ARGV[1])
if v then redis.call('HDEL', KEYS[1], ARGV[1]) end
return v
";

/// Redis-backed implementation. Deduplication scope: every process
/// instance pointed at the same store.
pub struct RedisBackend {
    conn: ConnectionManager,
    take_script: Script,
}

impl RedisBackend {
    /// Connect to the store at `url`, e.g. `redis://:secret@10.0.0.5:6379/`.
    pub async fn connect(url: &str) -> Result<Self, BackendError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let conn = ConnectionManager::new(client).await.map_err(unavailable)?;
        Ok(Self {
            conn,
            take_script: Script::new(TAKE_SCRIPT),
        })
    }

    fn lock_key(key: &str) -> String {
        format!("{LOCK_PREFIX}{key}")
    }
}

fn unavailable(source: redis::RedisError) -> BackendError {
    BackendError::Unavailable {
        source: Box::new(source),
    }
}

#[async_trait]
impl CoordinationBackend for RedisBackend {
    async fn put_if_absent(&self, key: &str, value: &str) -> Result<bool, BackendError> {
        let mut conn = self.conn.clone();
        let created: bool = conn
            .hset_nx(VALUES_HASH, key, value)
            .await
            .map_err(unavailable)?;
        Ok(created)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.hget(VALUES_HASH, key).await.map_err(unavailable)?;
        Ok(value)
    }

    async fn take(&self, key: &str) -> Result<Option<String>, BackendError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = self
            .take_script
            .key(VALUES_HASH)
            .arg(key)
            .invoke_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(value)
    }

    async fn try_lock(&self, key: &str, ttl: Duration) -> Result<bool, BackendError> {
        let mut conn = self.conn.clone();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        // SET NX PX answers OK to exactly one caller per expiry window.
        let reply: Option<String> = redis::cmd("SET")
            .arg(Self::lock_key(key))
            .arg("1")
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        let granted = reply.is_some();
        debug!(key, granted, ttl_ms, "lock probe");
        Ok(granted)
    }
}
