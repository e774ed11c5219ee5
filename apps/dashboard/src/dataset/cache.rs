//! Persistent dataset cache: one list-valued key holding encoded postings.

use async_trait::async_trait;
use redis::AsyncCommands;
use thiserror::Error;
use tracing::debug;

/// The single list key the dataset lives under.
pub const DATASET_KEY: &str = "dataset_list";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Append-only list storage for the dataset.
///
/// The loader is the only writer. Elements are opaque encoded blobs.
#[async_trait]
pub trait DatasetCache: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Every element of the list, in insertion order (`LRANGE key 0 -1`).
    async fn range_all(&self, key: &str) -> Result<Vec<Vec<u8>>, CacheError>;

    /// Right-pushes all `items` in one operation.
    async fn push_all(&self, key: &str, items: Vec<Vec<u8>>) -> Result<(), CacheError>;

    /// Removes the key. Operational use only; never reachable from a route.
    async fn clear(&self, key: &str) -> Result<bool, CacheError>;
}

/// Redis-backed cache using a multiplexed tokio connection per call.
#[derive(Clone)]
pub struct RedisDatasetCache {
    client: redis::Client,
}

impl RedisDatasetCache {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn conn(&self) -> Result<redis::aio::MultiplexedConnection, CacheError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl DatasetCache for RedisDatasetCache {
    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn().await?;
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn range_all(&self, key: &str) -> Result<Vec<Vec<u8>>, CacheError> {
        let mut conn = self.conn().await?;
        let items: Vec<Vec<u8>> = conn.lrange(key, 0, -1).await?;
        debug!("Read {} cached items from '{}'", items.len(), key);
        Ok(items)
    }

    async fn push_all(&self, key: &str, items: Vec<Vec<u8>>) -> Result<(), CacheError> {
        if items.is_empty() {
            return Ok(());
        }
        let count = items.len();
        let mut conn = self.conn().await?;
        conn.rpush::<_, _, ()>(key, items).await?;
        debug!("Pushed {} items onto '{}'", count, key);
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn().await?;
        let deleted: i64 = conn.del(key).await?;
        Ok(deleted > 0)
    }
}

/// In-process stand-in for Redis used by tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryDatasetCache {
    lists: std::sync::Mutex<std::collections::HashMap<String, Vec<Vec<u8>>>>,
    pushes: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MemoryDatasetCache {
    /// Number of `push_all` calls that wrote at least one item.
    pub fn push_count(&self) -> usize {
        self.pushes.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn len(&self, key: &str) -> usize {
        self.lists
            .lock()
            .unwrap()
            .get(key)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[cfg(test)]
#[async_trait]
impl DatasetCache for MemoryDatasetCache {
    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self
            .lists
            .lock()
            .unwrap()
            .get(key)
            .is_some_and(|items| !items.is_empty()))
    }

    async fn range_all(&self, key: &str) -> Result<Vec<Vec<u8>>, CacheError> {
        Ok(self
            .lists
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn push_all(&self, key: &str, items: Vec<Vec<u8>>) -> Result<(), CacheError> {
        if items.is_empty() {
            return Ok(());
        }
        self.pushes
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.lists
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .extend(items);
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.lists.lock().unwrap().remove(key).is_some())
    }
}
