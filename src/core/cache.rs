use crate::core::price::{PriceSeries, Quote};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Entries older than this are stale and trigger a provider fetch.
pub const FRESHNESS_WINDOW_HOURS: i64 = 24;

/// One cache slot per data kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Quote,
    DailySeries,
}

impl CacheKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKey::Quote => "quote",
            CacheKey::DailySeries => "daily_series",
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CachedPayload {
    Quote(Quote),
    Series(PriceSeries),
}

impl CachedPayload {
    pub fn into_quote(self) -> Option<Quote> {
        match self {
            CachedPayload::Quote(q) => Some(q),
            CachedPayload::Series(_) => None,
        }
    }

    pub fn into_series(self) -> Option<PriceSeries> {
        match self {
            CachedPayload::Series(s) => Some(s),
            CachedPayload::Quote(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub payload: CachedPayload,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(payload: CachedPayload, fetched_at: DateTime<Utc>) -> Self {
        Self {
            payload,
            fetched_at,
        }
    }

    /// `now - fetched_at > 24h`. An entry exactly 24h old is still fresh.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now - self.fetched_at > Duration::hours(FRESHNESS_WINDOW_HOURS)
    }
}

/// Storage for fetched price data.
///
/// Stores never expire entries on their own: staleness is decided by the
/// reader, and the newest entry doubles as last-known-good data.
#[async_trait]
pub trait PriceCache: Send + Sync {
    async fn get(&self, key: CacheKey) -> Option<CacheEntry>;

    /// Replaces any existing entry for `key`.
    async fn put(&self, key: CacheKey, entry: CacheEntry);
}
