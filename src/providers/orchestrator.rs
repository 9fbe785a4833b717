use crate::core::cache::{CacheEntry, CacheKey, CachedPayload, PriceCache};
use crate::core::error::{AllProvidersFailedError, ProviderError};
use crate::core::price::{PriceSeries, PriceSource, Quote};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Read-through cache in front of an ordered list of price sources.
///
/// A fresh cache entry is returned without touching the network. Otherwise the
/// sources are tried one at a time, in order, and the first success replaces
/// the cache entry. Stale entries are never returned from here.
pub struct PriceOrchestrator {
    sources: Vec<Arc<dyn PriceSource>>,
    cache: Arc<dyn PriceCache>,
    lookback_days: u32,
}

impl PriceOrchestrator {
    pub fn new(
        sources: Vec<Arc<dyn PriceSource>>,
        cache: Arc<dyn PriceCache>,
        lookback_days: u32,
    ) -> Self {
        Self {
            sources,
            cache,
            lookback_days,
        }
    }

    pub fn cache(&self) -> &Arc<dyn PriceCache> {
        &self.cache
    }

    pub async fn get_quote(&self) -> Result<Quote, AllProvidersFailedError> {
        self.acquire(CacheKey::Quote, CachedPayload::into_quote).await
    }

    pub async fn get_daily_series(&self) -> Result<PriceSeries, AllProvidersFailedError> {
        self.acquire(CacheKey::DailySeries, CachedPayload::into_series)
            .await
    }

    async fn fetch_from(
        &self,
        source: &dyn PriceSource,
        key: CacheKey,
    ) -> Result<CachedPayload, ProviderError> {
        match key {
            CacheKey::Quote => source.fetch_quote().await.map(CachedPayload::Quote),
            CacheKey::DailySeries => source
                .fetch_daily_series(self.lookback_days)
                .await
                .map(CachedPayload::Series),
        }
    }

    async fn acquire<T>(
        &self,
        key: CacheKey,
        extract: fn(CachedPayload) -> Option<T>,
    ) -> Result<T, AllProvidersFailedError> {
        if let Some(entry) = self.cache.get(key).await {
            if entry.is_stale(Utc::now()) {
                debug!(%key, fetched_at = %entry.fetched_at, "Cached entry is stale");
            } else if let Some(value) = extract(entry.payload) {
                debug!(%key, "Using cached market data");
                return Ok(value);
            }
        }

        let mut failures = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let payload = match self.fetch_from(source.as_ref(), key).await {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(%key, provider = source.name(), cause = %e.cause, "Provider failed");
                    failures.push(e);
                    continue;
                }
            };
            let Some(value) = extract(payload.clone()) else {
                failures.push(ProviderError::new(
                    source.name(),
                    format!("returned the wrong payload kind for {key}"),
                ));
                continue;
            };

            self.cache
                .put(key, CacheEntry::new(payload, Utc::now()))
                .await;
            info!(%key, provider = source.name(), "Cached new market data");
            return Ok(value);
        }

        Err(AllProvidersFailedError { failures })
    }
}
