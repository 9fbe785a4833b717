use crate::core::cache::{CacheEntry, CacheKey, PriceCache};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "market_data";

/// Price cache persisted in a fjall partition, one JSON record per key.
pub struct DiskCache {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskCache {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create cache directory: {}", path.display()))?;
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open cache keyspace: {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open cache partition")?;
        Ok(Self {
            keyspace,
            partition,
        })
    }

    fn read(&self, key: CacheKey) -> Result<Option<CacheEntry>> {
        match self.partition.get(key.as_str())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, key: CacheKey, entry: &CacheEntry) -> Result<()> {
        self.partition
            .insert(key.as_str(), serde_json::to_vec(entry)?)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

#[async_trait]
impl PriceCache for DiskCache {
    async fn get(&self, key: CacheKey) -> Option<CacheEntry> {
        match self.read(key) {
            Ok(Some(entry)) => {
                debug!("Cache HIT for key: {}", key);
                Some(entry)
            }
            Ok(None) => {
                debug!("Cache MISS for key: {}", key);
                None
            }
            Err(e) => {
                debug!("DiskCache get error for key {}: {:#}", key, e);
                None
            }
        }
    }

    async fn put(&self, key: CacheKey, entry: CacheEntry) {
        match self.write(key, &entry) {
            Ok(()) => debug!("Cache PUT for key: {}", key),
            Err(e) => debug!("DiskCache put error for key {}: {:#}", key, e),
        }
    }
}
