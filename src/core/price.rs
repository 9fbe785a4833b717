//! Pricing abstractions and core types

use crate::core::error::ProviderError;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default number of calendar days of daily closes requested from providers.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// Latest price snapshot for the tracked instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub close: Decimal,
}

/// Daily closes ordered by date, one point per date, every close positive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries(Vec<PricePoint>);

impl PriceSeries {
    /// Normalizes raw points: drops non-positive closes, sorts by date and
    /// keeps the last occurrence of a duplicated date.
    pub fn from_points(points: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut points: Vec<PricePoint> = points
            .into_iter()
            .filter(|p| p.close > Decimal::ZERO)
            .collect();
        // Stable sort keeps input order within a date; reverse so dedup keeps the last one.
        points.sort_by_key(|p| p.date);
        points.reverse();
        points.dedup_by_key(|p| p.date);
        points.reverse();
        Self(points)
    }

    /// Keeps only points dated on or after `cutoff`.
    pub fn since(self, cutoff: NaiveDate) -> Self {
        Self(self.0.into_iter().filter(|p| p.date >= cutoff).collect())
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.0
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One upstream quote/history provider.
///
/// Implementations translate a single provider's wire format and never retry;
/// fallback across providers is [`crate::providers::orchestrator::PriceOrchestrator`]'s job.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_quote(&self) -> Result<Quote, ProviderError>;

    async fn fetch_daily_series(&self, lookback_days: u32) -> Result<PriceSeries, ProviderError>;
}
