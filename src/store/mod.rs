pub mod contributions;
pub mod disk;
pub mod memory;

use crate::core::cache::PriceCache;
use crate::core::config::AppConfig;
use disk::DiskCache;
use memory::MemoryCache;
use std::sync::Arc;
use tracing::warn;

/// Opens the persistent price cache under the configured data directory,
/// falling back to an in-memory cache when it cannot be opened.
pub fn open_price_cache(config: &AppConfig) -> Arc<dyn PriceCache> {
    let opened = config
        .data_path()
        .and_then(|path| DiskCache::open(&path.join("cache")));

    match opened {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            warn!("Persistent cache unavailable, using memory: {:#}", e);
            Arc::new(MemoryCache::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::{CacheEntry, CacheKey, CachedPayload};
    use crate::core::price::Quote;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn config_with_data_path(path: &str) -> AppConfig {
        serde_yaml::from_str(&format!(
            "contributions: roundups.csv\ndata_path: \"{path}\"\n"
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_open_price_cache_persists_under_data_path() {
        let dir = TempDir::new().unwrap();
        let config = config_with_data_path(dir.path().to_str().unwrap());

        let entry = CacheEntry::new(CachedPayload::Quote(Quote { close: dec!(99) }), Utc::now());
        {
            let cache = open_price_cache(&config);
            cache.put(CacheKey::Quote, entry.clone()).await;
        }

        assert!(dir.path().join("cache").exists());
        let cache = open_price_cache(&config);
        assert_eq!(cache.get(CacheKey::Quote).await, Some(entry));
    }
}
