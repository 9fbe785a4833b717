//! Finnhub quote and daily candle adapter.
//!
//! Uses `/quote` for the latest price and `/stock/candle` with daily resolution
//! for history. Both endpoints require an API token.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::config::FINNHUB_KEY_ENV;
use crate::core::error::ProviderError;
use crate::core::price::{PricePoint, PriceSeries, PriceSource, Quote};
use crate::providers::{http_client, response_text};

const NAME: &str = "finnhub";

pub struct FinnhubProvider {
    base_url: String,
    api_key: Option<String>,
    symbol: String,
}

impl FinnhubProvider {
    pub fn new(base_url: &str, api_key: Option<String>, symbol: &str) -> Self {
        FinnhubProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            symbol: symbol.to_string(),
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Missing {FINNHUB_KEY_ENV}"))
    }

    async fn get(&self, endpoint: &str, params: &str) -> Result<String> {
        let token = self.api_key()?;
        let url = format!("{}{}?{}", self.base_url, endpoint, params);
        debug!("Requesting Finnhub data from {}", url);

        let client = http_client()?;
        let response = client
            .get(format!("{url}&token={token}"))
            .send()
            .await
            .with_context(|| format!("Request error for symbol: {}", self.symbol))?;

        response_text(response).await
    }

    async fn quote(&self) -> Result<Quote> {
        let text = self
            .get("/quote", &format!("symbol={}", self.symbol))
            .await?;
        let data: QuoteResponse = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse Finnhub /quote response for {}", self.symbol))?;

        if let Some(error) = data.error {
            bail!(error);
        }
        match data.c.and_then(Decimal::from_f64) {
            Some(close) if close > Decimal::ZERO => Ok(Quote { close }),
            _ => bail!("Unexpected Finnhub /quote response"),
        }
    }

    async fn daily_series(&self, lookback_days: u32) -> Result<PriceSeries> {
        let to = Utc::now();
        let from = to - Duration::days(i64::from(lookback_days));
        let params = format!(
            "symbol={}&resolution=D&from={}&to={}",
            self.symbol,
            from.timestamp(),
            to.timestamp()
        );
        let text = self.get("/stock/candle", &params).await?;
        let data: CandleResponse = serde_json::from_str(&text).with_context(|| {
            format!("Failed to parse Finnhub candle response for {}", self.symbol)
        })?;

        if data.s.as_deref() != Some("ok") {
            let reason = data
                .error
                .or(data.s)
                .unwrap_or_else(|| "Unexpected Finnhub response".to_string());
            bail!(reason);
        }
        if data.t.len() != data.c.len() {
            bail!(
                "Finnhub candle arrays differ in length: {} timestamps, {} closes",
                data.t.len(),
                data.c.len()
            );
        }

        let points = data
            .t
            .iter()
            .zip(&data.c)
            .map(|(ts, close)| {
                let date = DateTime::from_timestamp(*ts, 0)
                    .ok_or_else(|| anyhow!("Invalid candle timestamp: {ts}"))?
                    .date_naive();
                let close = Decimal::from_f64(*close)
                    .ok_or_else(|| anyhow!("Non-finite close on {date}"))?;
                Ok(PricePoint { date, close })
            })
            .collect::<Result<Vec<_>>>()?;

        let series = PriceSeries::from_points(points).since(from.date_naive());
        if series.is_empty() {
            bail!("Finnhub returned no candles for {}", self.symbol);
        }
        Ok(series)
    }
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price
    c: Option<f64>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandleResponse {
    /// Status: "ok" or "no_data"
    s: Option<String>,
    #[serde(default)]
    c: Vec<f64>,
    /// Unix seconds
    #[serde(default)]
    t: Vec<i64>,
    error: Option<String>,
}

#[async_trait]
impl PriceSource for FinnhubProvider {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(name = "FinnhubQuote", skip(self), fields(symbol = %self.symbol))]
    async fn fetch_quote(&self) -> Result<Quote, ProviderError> {
        self.quote()
            .await
            .map_err(|e| ProviderError::from_anyhow(NAME, e))
    }

    #[instrument(name = "FinnhubDaily", skip(self), fields(symbol = %self.symbol))]
    async fn fetch_daily_series(&self, lookback_days: u32) -> Result<PriceSeries, ProviderError> {
        self.daily_series(lookback_days)
            .await
            .map_err(|e| ProviderError::from_anyhow(NAME, e))
    }
}
