pub mod alpha_vantage;
pub mod finnhub;
pub mod orchestrator;
pub mod stooq;

use crate::core::config::AppConfig;
use crate::core::price::PriceSource;
use crate::core::PriceCache;
use alpha_vantage::AlphaVantageProvider;
use finnhub::FinnhubProvider;
use orchestrator::PriceOrchestrator;
use anyhow::{Context, bail};
use std::sync::Arc;
use stooq::StooqProvider;

const USER_AGENT: &str = concat!("zai/", env!("CARGO_PKG_VERSION"));

pub(crate) fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}

/// Body of a successful response. Other statuses fail with the status and
/// the provider's own message, if any.
pub(crate) async fn response_text(response: reqwest::Response) -> anyhow::Result<String> {
    let status = response.status();
    let text = response
        .text()
        .await
        .context("Failed to read response body")?;
    if status.is_success() {
        return Ok(text);
    }
    match text.trim() {
        "" => bail!("HTTP {status}"),
        body => bail!("HTTP {status} {body}"),
    }
}

/// Configured providers in priority order: Finnhub, Alpha Vantage, Stooq.
pub fn configured_sources(config: &AppConfig) -> Vec<Arc<dyn PriceSource>> {
    let providers = &config.providers;
    let mut sources: Vec<Arc<dyn PriceSource>> = Vec::new();
    if let Some(p) = &providers.finnhub {
        sources.push(Arc::new(FinnhubProvider::new(
            &p.base_url,
            p.resolve_api_key(),
            &config.symbol,
        )));
    }
    if let Some(p) = &providers.alpha_vantage {
        sources.push(Arc::new(AlphaVantageProvider::new(
            &p.base_url,
            p.resolve_api_key(),
            &config.symbol,
        )));
    }
    if let Some(p) = &providers.stooq {
        sources.push(Arc::new(StooqProvider::new(&p.base_url, &config.symbol)));
    }
    sources
}

pub fn build_orchestrator(config: &AppConfig, cache: Arc<dyn PriceCache>) -> PriceOrchestrator {
    PriceOrchestrator::new(configured_sources(config), cache, config.lookback_days)
}
