//! TTL result cache
//!
//! Only successful results are cached; the stored value is the rendered
//! result text. Reads try the shared Redis tier first (when built with the
//! `redis` feature and configured), then the in-process tier. Writes go to
//! both.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::CacheConfig;

const KEY_PREFIX: &str = "calc";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(String),
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Key/value store with per-entry expiry
pub trait ResultStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = CacheResult<Option<String>>> + Send;

    fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl Future<Output = CacheResult<()>> + Send;

    fn delete(&self, key: &str) -> impl Future<Output = CacheResult<()>> + Send;

    fn clear(&self) -> impl Future<Output = CacheResult<()>> + Send;

    fn len(&self) -> impl Future<Output = CacheResult<usize>> + Send;
}

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process store
///
/// Expired entries are dropped on read and by [`MemoryStore::purge_expired`].
/// With a non-zero `max_entries`, inserting into a full store evicts the
/// entry closest to expiry.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
    max_entries: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
        }
    }

    /// Remove every expired entry; returns how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }
}

impl ResultStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()));
                },
                Some(_) => {},
                None => return Ok(None),
            }
        }

        // Expired: drop it unless it was refreshed in between
        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut entries = self.entries.write().await;

        if self.max_entries > 0 && entries.len() >= self.max_entries && !entries.contains_key(key)
        {
            let now = Instant::now();
            entries.retain(|_, entry| entry.expires_at > now);

            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn len(&self) -> CacheResult<usize> {
        Ok(self.entries.read().await.len())
    }
}

#[cfg(feature = "redis")]
pub use redis_store::RedisStore;

#[cfg(feature = "redis")]
mod redis_store {
    use super::*;
    use redis::aio::ConnectionManager;

    /// Shared store backed by Redis `SETEX`
    #[derive(Clone)]
    pub struct RedisStore {
        conn: ConnectionManager,
    }

    impl RedisStore {
        pub async fn connect(url: &str) -> CacheResult<Self> {
            let client =
                redis::Client::open(url).map_err(|e| CacheError::Redis(e.to_string()))?;
            let conn = client
                .get_connection_manager()
                .await
                .map_err(|e| CacheError::Redis(e.to_string()))?;
            Ok(Self { conn })
        }

        async fn keys(&self) -> CacheResult<Vec<String>> {
            let mut conn = self.conn.clone();
            redis::cmd("KEYS")
                .arg(format!("{}:*", KEY_PREFIX))
                .query_async(&mut conn)
                .await
                .map_err(|e| CacheError::Redis(e.to_string()))
        }
    }

    impl ResultStore for RedisStore {
        async fn get(&self, key: &str) -> CacheResult<Option<String>> {
            let mut conn = self.conn.clone();
            redis::cmd("GET")
                .arg(key)
                .query_async(&mut conn)
                .await
                .map_err(|e| CacheError::Redis(e.to_string()))
        }

        async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
            let mut conn = self.conn.clone();
            redis::cmd("SETEX")
                .arg(key)
                .arg(ttl.as_secs().max(1))
                .arg(value)
                .query_async(&mut conn)
                .await
                .map_err(|e| CacheError::Redis(e.to_string()))
        }

        async fn delete(&self, key: &str) -> CacheResult<()> {
            let mut conn = self.conn.clone();
            redis::cmd("DEL")
                .arg(key)
                .query_async(&mut conn)
                .await
                .map_err(|e| CacheError::Redis(e.to_string()))
        }

        async fn clear(&self) -> CacheResult<()> {
            let keys = self.keys().await?;
            if keys.is_empty() {
                return Ok(());
            }
            let mut conn = self.conn.clone();
            redis::cmd("DEL")
                .arg(keys)
                .query_async(&mut conn)
                .await
                .map_err(|e| CacheError::Redis(e.to_string()))
        }

        async fn len(&self) -> CacheResult<usize> {
            Ok(self.keys().await?.len())
        }
    }
}

/// Cache key for an arithmetic expression
pub fn expression_key(expression: &str) -> String {
    format!("{}:expr:{}", KEY_PREFIX, expression)
}

/// Cache key for a scientific call; the value is keyed by its exact bits
pub fn scientific_key(function: &str, value: f64) -> String {
    format!("{}:sci:{}:{:016x}", KEY_PREFIX, function, value.to_bits())
}

/// Two-tier result cache with hit/miss accounting
pub struct ResultCache {
    enabled: bool,
    ttl: Duration,
    memory: MemoryStore,
    #[cfg(feature = "redis")]
    redis: Option<RedisStore>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            ttl: config.ttl(),
            memory: MemoryStore::with_max_entries(config.max_entries),
            #[cfg(feature = "redis")]
            redis: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[cfg(feature = "redis")]
    pub fn with_redis(mut self, store: RedisStore) -> Self {
        self.redis = Some(store);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        #[cfg(feature = "redis")]
        if let Some(redis) = &self.redis {
            match redis.get(key).await {
                Ok(Some(value)) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(value);
                },
                Ok(None) => {},
                Err(e) => tracing::warn!("Cache read from Redis failed: {}", e),
            }
        }

        match self.memory.get(key).await {
            Ok(Some(value)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key, "cache hit");
                Some(value)
            },
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            },
        }
    }

    pub async fn set(&self, key: &str, value: &str) {
        if !self.enabled {
            return;
        }

        // The memory tier never fails
        let _ = self.memory.set(key, value, self.ttl).await;

        #[cfg(feature = "redis")]
        if let Some(redis) = &self.redis {
            if let Err(e) = redis.set(key, value, self.ttl).await {
                tracing::warn!("Cache write to Redis failed: {}", e);
            }
        }
    }

    pub async fn clear(&self) {
        let _ = self.memory.clear().await;

        #[cfg(feature = "redis")]
        if let Some(redis) = &self.redis {
            if let Err(e) = redis.clear().await {
                tracing::warn!("Cache clear on Redis failed: {}", e);
            }
        }
    }

    /// Entries held in the memory tier
    pub async fn len(&self) -> usize {
        self.memory.len().await.unwrap_or(0)
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn purge_expired(&self) -> usize {
        self.memory.purge_expired().await
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
