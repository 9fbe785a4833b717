use crate::core::cache::{CacheEntry, CacheKey, PriceCache};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory price cache. Entries live as long as the process.
#[derive(Clone, Default)]
pub struct MemoryCache {
    inner: Arc<Mutex<HashMap<CacheKey, CacheEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PriceCache for MemoryCache {
    async fn get(&self, key: CacheKey) -> Option<CacheEntry> {
        let cache = self.inner.lock().await;
        let value = cache.get(&key).cloned();
        if value.is_some() {
            debug!("Cache HIT for key: {}", key);
        } else {
            debug!("Cache MISS for key: {}", key);
        }
        value
    }

    async fn put(&self, key: CacheKey, entry: CacheEntry) {
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {}", key);
        cache.insert(key, entry);
    }
}
