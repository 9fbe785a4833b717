pub mod import;
pub mod portfolio;
pub mod prices;
pub mod setup;
pub mod streaks;
pub mod summary;
pub mod ui;

use crate::core::error::AllProvidersFailedError;
use crate::core::price::{PriceSeries, Quote};
use crate::market::{self, Acquired};
use crate::providers::orchestrator::PriceOrchestrator;
use anyhow::{Context, Result};

/// Quote and daily series for the configured symbol, acquired together.
pub struct MarketSnapshot {
    pub quote: Result<Acquired<Quote>, AllProvidersFailedError>,
    pub series: Result<Acquired<PriceSeries>, AllProvidersFailedError>,
}

impl MarketSnapshot {
    /// Fetches both concurrently behind a spinner.
    pub async fn fetch(orchestrator: &PriceOrchestrator) -> Self {
        let pb = ui::new_spinner("Fetching market data...");
        let (quote, series) = futures::join!(
            market::quote_with_fallback(orchestrator),
            market::series_with_fallback(orchestrator)
        );
        pb.finish_and_clear();
        MarketSnapshot { quote, series }
    }

    /// Stale-data warnings for whatever was served from the cache.
    pub fn notices(&self) -> Vec<String> {
        let quote = self.quote.as_ref().ok().and_then(|q| q.notice("quote"));
        let series = self
            .series
            .as_ref()
            .ok()
            .and_then(|s| s.notice("price history"));
        quote.into_iter().chain(series).collect()
    }

    pub fn print_notices(&self) {
        for notice in self.notices() {
            println!("{}", ui::style_text(&notice, ui::StyleType::Warning));
        }
    }

    /// Both results, or the first acquisition error.
    pub fn require(self) -> Result<(Acquired<Quote>, Acquired<PriceSeries>)> {
        let quote = self.quote.context("Failed to fetch latest quote")?;
        let series = self.series.context("Failed to fetch price history")?;
        Ok((quote, series))
    }
}
