//! Caller-side degradation for market data.
//!
//! When every provider fails, the most recent cached entry (however old) is
//! served as last-known-good data and tagged [`Freshness::Stale`], so the user
//! can be told live data is unavailable. Without any cached data the error
//! propagates.

use crate::core::cache::{CacheKey, CachedPayload, PriceCache};
use crate::core::error::AllProvidersFailedError;
use crate::core::price::{PriceSeries, Quote};
use crate::providers::orchestrator::PriceOrchestrator;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Freshness {
    Live,
    Stale { fetched_at: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acquired<T> {
    pub value: T,
    pub freshness: Freshness,
}

impl<T> Acquired<T> {
    pub fn is_stale(&self) -> bool {
        matches!(self.freshness, Freshness::Stale { .. })
    }

    /// User-facing warning for stale data; `None` when live.
    pub fn notice(&self, what: &str) -> Option<String> {
        match self.freshness {
            Freshness::Live => None,
            Freshness::Stale { fetched_at } => Some(format!(
                "Live {what} unavailable; showing stale data from {}",
                fetched_at.format("%Y-%m-%d %H:%M UTC")
            )),
        }
    }
}

async fn with_fallback<T>(
    live: Result<T, AllProvidersFailedError>,
    cache: &dyn PriceCache,
    key: CacheKey,
    extract: fn(CachedPayload) -> Option<T>,
) -> Result<Acquired<T>, AllProvidersFailedError> {
    let err = match live {
        Ok(value) => {
            return Ok(Acquired {
                value,
                freshness: Freshness::Live,
            });
        }
        Err(err) => err,
    };

    let Some(entry) = cache.get(key).await else {
        return Err(err);
    };
    let fetched_at = entry.fetched_at;
    match extract(entry.payload) {
        Some(value) => {
            warn!(%key, %fetched_at, error = %err, "Serving last-known-good market data");
            Ok(Acquired {
                value,
                freshness: Freshness::Stale { fetched_at },
            })
        }
        None => Err(err),
    }
}

pub async fn quote_with_fallback(
    orchestrator: &PriceOrchestrator,
) -> Result<Acquired<Quote>, AllProvidersFailedError> {
    with_fallback(
        orchestrator.get_quote().await,
        orchestrator.cache().as_ref(),
        CacheKey::Quote,
        CachedPayload::into_quote,
    )
    .await
}

pub async fn series_with_fallback(
    orchestrator: &PriceOrchestrator,
) -> Result<Acquired<PriceSeries>, AllProvidersFailedError> {
    with_fallback(
        orchestrator.get_daily_series().await,
        orchestrator.cache().as_ref(),
        CacheKey::DailySeries,
        CachedPayload::into_series,
    )
    .await
}
