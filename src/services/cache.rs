use crate::models::UserId;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

/// Store a value only while the key's generation still matches ARGV[1].
const SET_IF_CURRENT: &str = r"
local current = redis.call('GET', KEYS[2]) or '0'
if current == ARGV[1] then
    redis.call('SETEX', KEYS[1], ARGV[2], ARGV[3])
    return 1
end
return 0
";

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

enum Tier {
    /// In-process moka cache, valid for a single instance
    Local {
        entries: moka::future::Cache<String, Vec<u8>>,
        generations: Mutex<HashMap<String, u64>>,
    },
    /// Redis shared by every instance
    Shared(Arc<Mutex<ConnectionManager>>),
}

/// Read-through cache for mutable records
///
/// Each key carries a generation that `invalidate` bumps. A reader takes the
/// generation before loading from the store and hands it to `set_if_current`,
/// so a load that raced with a write is never cached.
///
/// With a Redis URL the cache lives in Redis only and no per-process copy is
/// kept, which makes an invalidation on one instance visible to all of them.
/// Without one, moka holds everything.
pub struct CacheManager {
    tier: Tier,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a cache manager, connecting to Redis when a URL is given
    pub async fn new(
        redis_url: Option<&str>,
        l1_size: u64,
        ttl_secs: u64,
    ) -> Result<Self, CacheError> {
        let Some(url) = redis_url else {
            return Ok(Self::in_memory(l1_size, ttl_secs));
        };

        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;

        Ok(Self {
            tier: Tier::Shared(Arc::new(Mutex::new(manager))),
            ttl_secs,
        })
    }

    /// Process-local cache manager
    pub fn in_memory(l1_size: u64, ttl_secs: u64) -> Self {
        Self {
            tier: Tier::Local {
                entries: moka::future::CacheBuilder::new(l1_size)
                    .time_to_live(Duration::from_secs(ttl_secs))
                    .build(),
                generations: Mutex::new(HashMap::new()),
            },
            ttl_secs,
        }
    }

    pub fn has_redis(&self) -> bool {
        matches!(self.tier, Tier::Shared(_))
    }

    /// Get a cached value
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let bytes: Option<Vec<u8>> = match &self.tier {
            Tier::Local { entries, .. } => entries.get(key).await,
            Tier::Shared(conn) => {
                redis::cmd("GET")
                    .arg(key)
                    .query_async(&mut *conn.lock().await)
                    .await?
            }
        };

        match bytes {
            Some(bytes) => {
                tracing::trace!("Cache hit: {}", key);
                Ok(serde_json::from_slice(&bytes)?)
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Err(CacheError::CacheMiss(key.to_string()))
            }
        }
    }

    /// Current invalidation generation of a key
    pub async fn generation(&self, key: &str) -> Result<u64, CacheError> {
        match &self.tier {
            Tier::Local { generations, .. } => {
                Ok(generations.lock().await.get(key).copied().unwrap_or(0))
            }
            Tier::Shared(conn) => {
                let mut conn = conn.lock().await;
                let generation: Option<u64> = redis::cmd("GET")
                    .arg(generation_key(key))
                    .query_async(&mut *conn)
                    .await?;
                Ok(generation.unwrap_or(0))
            }
        }
    }

    /// Cache a value unless the key was invalidated after `generation` was read
    ///
    /// Returns whether the value was stored.
    pub async fn set_if_current<T>(
        &self,
        key: &str,
        generation: u64,
        value: &T,
    ) -> Result<bool, CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_vec(value)?;

        let stored = match &self.tier {
            Tier::Local {
                entries,
                generations,
            } => {
                let generations = generations.lock().await;
                if generations.get(key).copied().unwrap_or(0) == generation {
                    entries.insert(key.to_string(), json).await;
                    true
                } else {
                    false
                }
            }
            Tier::Shared(conn) => {
                let mut conn = conn.lock().await;
                let stored: i64 = redis::Script::new(SET_IF_CURRENT)
                    .key(key)
                    .key(generation_key(key))
                    .arg(generation)
                    .arg(self.ttl_secs)
                    .arg(json)
                    .invoke_async(&mut *conn)
                    .await?;
                stored == 1
            }
        };

        if stored {
            tracing::trace!("Cache set: {}", key);
        } else {
            tracing::debug!("Skipped caching {}: invalidated during load", key);
        }
        Ok(stored)
    }

    /// Drop a value and bump its generation so in-flight loads are discarded
    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        match &self.tier {
            Tier::Local {
                entries,
                generations,
            } => {
                let mut generations = generations.lock().await;
                *generations.entry(key.to_string()).or_insert(0) += 1;
                entries.invalidate(key).await;
            }
            Tier::Shared(conn) => {
                let mut conn = conn.lock().await;
                let _: () = redis::pipe()
                    .atomic()
                    .incr(generation_key(key), 1)
                    .ignore()
                    .del(key)
                    .ignore()
                    .query_async(&mut *conn)
                    .await?;
            }
        }

        tracing::trace!("Cache invalidate: {}", key);
        Ok(())
    }
}

// Generation keys carry no TTL: an expired counter restarting at an old value
// would let a stale load through.
fn generation_key(key: &str) -> String {
    format!("{}:gen", key)
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a stored user record
    pub fn user(user_id: UserId) -> String {
        format!("user:{}", user_id)
    }
}
