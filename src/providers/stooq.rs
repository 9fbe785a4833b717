//! Stooq CSV adapter. Needs no API key, which makes it the last resort.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, instrument};

use crate::core::error::ProviderError;
use crate::core::price::{PricePoint, PriceSeries, PriceSource, Quote};
use crate::providers::{http_client, response_text};

const NAME: &str = "stooq";

pub struct StooqProvider {
    base_url: String,
    ticker: String,
}

/// Date/close pairs read from a Stooq CSV body. Rows without a date or with a
/// non-numeric close are dropped.
fn parse_closes(text: &str) -> Result<Vec<(String, Decimal)>> {
    let text = text.trim();
    if text.lines().count() < 2 {
        bail!("Stooq: empty CSV");
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers().context("Stooq: unreadable header")?.clone();
    let date_idx = headers.iter().position(|h| h.trim() == "Date");
    let close_idx = headers.iter().position(|h| h.trim() == "Close");
    let (Some(date_idx), Some(close_idx)) = (date_idx, close_idx) else {
        bail!("Stooq: bad header");
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("Stooq: malformed CSV row")?;
        let date = record.get(date_idx).map(str::trim).unwrap_or_default();
        let close = record
            .get(close_idx)
            .and_then(|c| Decimal::from_str(c.trim()).ok());
        match close {
            Some(close) if !date.is_empty() => rows.push((date.to_string(), close)),
            _ => continue,
        }
    }
    Ok(rows)
}

impl StooqProvider {
    pub fn new(base_url: &str, symbol: &str) -> Self {
        let symbol = symbol.to_lowercase();
        // Bare tickers refer to US listings on Stooq.
        let ticker = if symbol.contains('.') {
            symbol
        } else {
            format!("{symbol}.us")
        };
        StooqProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            ticker,
        }
    }

    async fn get_csv(&self, endpoint: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Requesting Stooq CSV from {}", url);

        let client = http_client()?;
        let response = client
            .get(&url)
            .header(reqwest::header::ACCEPT, "text/csv")
            .send()
            .await
            .with_context(|| format!("Request error for ticker: {}", self.ticker))?;
        response_text(response).await.context("Stooq")
    }

    async fn quote(&self) -> Result<Quote> {
        let text = self
            .get_csv(&format!("/q/l/?s={}&f=sd2t2ohlcv&h&e=csv", self.ticker))
            .await?;
        let rows = parse_closes(&text)?;
        match rows.last() {
            Some((_, close)) if *close > Decimal::ZERO => Ok(Quote { close: *close }),
            _ => bail!("Stooq: no quote for {}", self.ticker),
        }
    }

    async fn daily_series(&self, lookback_days: u32) -> Result<PriceSeries> {
        let text = self
            .get_csv(&format!("/q/d/l/?s={}&i=d", self.ticker))
            .await?;

        let points: Vec<PricePoint> = parse_closes(&text)?
            .into_iter()
            .filter_map(|(date, close)| {
                NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                    .ok()
                    .map(|date| PricePoint { date, close })
            })
            .collect();

        let cutoff = Utc::now().date_naive() - Duration::days(i64::from(lookback_days));
        let series = PriceSeries::from_points(points).since(cutoff);
        if series.is_empty() {
            bail!("Stooq: empty CSV");
        }
        Ok(series)
    }
}

#[async_trait]
impl PriceSource for StooqProvider {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(name = "StooqQuote", skip(self), fields(ticker = %self.ticker))]
    async fn fetch_quote(&self) -> Result<Quote, ProviderError> {
        self.quote()
            .await
            .map_err(|e| ProviderError::from_anyhow(NAME, e))
    }

    #[instrument(name = "StooqDaily", skip(self), fields(ticker = %self.ticker))]
    async fn fetch_daily_series(&self, lookback_days: u32) -> Result<PriceSeries, ProviderError> {
        self.daily_series(lookback_days)
            .await
            .map_err(|e| ProviderError::from_anyhow(NAME, e))
    }
}
