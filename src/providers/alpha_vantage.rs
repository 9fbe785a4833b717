//! Alpha Vantage adapter using the free `GLOBAL_QUOTE` and `TIME_SERIES_DAILY`
//! endpoints.
//!
//! Throttling and quota problems come back as HTTP 200 with an `Information`
//! or `Note` field instead of data; those messages are surfaced as failures.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, instrument};

use crate::core::config::ALPHA_VANTAGE_KEY_ENV;
use crate::core::error::ProviderError;
use crate::core::price::{PricePoint, PriceSeries, PriceSource, Quote};
use crate::providers::{http_client, response_text};

const NAME: &str = "alpha_vantage";

pub struct AlphaVantageProvider {
    base_url: String,
    api_key: Option<String>,
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct ApiMessages {
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

impl ApiMessages {
    fn check(&self) -> Result<()> {
        if let Some(info) = &self.information {
            bail!("Alpha Vantage info: {info}");
        }
        if let Some(note) = &self.note {
            bail!("Alpha Vantage note: {note}");
        }
        if let Some(err) = &self.error_message {
            bail!("Alpha Vantage error: {err}");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(flatten)]
    messages: ApiMessages,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyBar>>,
    #[serde(flatten)]
    messages: ApiMessages,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "4. close")]
    close: String,
}

impl AlphaVantageProvider {
    pub fn new(base_url: &str, api_key: Option<String>, symbol: &str) -> Self {
        AlphaVantageProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            symbol: symbol.to_string(),
        }
    }

    async fn query(&self, function: &str, extra: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Missing {ALPHA_VANTAGE_KEY_ENV}"))?;
        let url = format!(
            "{}/query?function={}&symbol={}{}",
            self.base_url, function, self.symbol, extra
        );
        debug!("Requesting Alpha Vantage data from {}", url);

        let client = http_client()?;
        let response = client
            .get(format!("{url}&apikey={api_key}"))
            .send()
            .await
            .with_context(|| format!("Request error for symbol: {}", self.symbol))?;

        response_text(response).await.context("Alpha Vantage")
    }

    async fn quote(&self) -> Result<Quote> {
        let text = self.query("GLOBAL_QUOTE", "").await?;
        let data: GlobalQuoteResponse = serde_json::from_str(&text).with_context(|| {
            format!("Failed to parse Alpha Vantage quote for {}", self.symbol)
        })?;
        data.messages.check()?;

        let price = data
            .global_quote
            .and_then(|q| q.price)
            .ok_or_else(|| anyhow!("Alpha Vantage: missing 'Global Quote' price"))?;
        let close = Decimal::from_str(price.trim())
            .with_context(|| format!("Alpha Vantage: invalid price '{price}'"))?;
        if close <= Decimal::ZERO {
            bail!("Alpha Vantage: non-positive price {close}");
        }
        Ok(Quote { close })
    }

    async fn daily_series(&self, lookback_days: u32) -> Result<PriceSeries> {
        let text = self
            .query("TIME_SERIES_DAILY", "&outputsize=compact")
            .await?;
        let data: TimeSeriesResponse = serde_json::from_str(&text).with_context(|| {
            format!("Failed to parse Alpha Vantage series for {}", self.symbol)
        })?;
        data.messages.check()?;

        let series = data
            .time_series
            .ok_or_else(|| anyhow!("Alpha Vantage: missing 'Time Series (Daily)'"))?;

        let points = series
            .iter()
            .map(|(date, bar)| {
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .with_context(|| format!("Alpha Vantage: invalid date '{date}'"))?;
                let close = Decimal::from_str(bar.close.trim())
                    .with_context(|| format!("Alpha Vantage: invalid close on {date}"))?;
                Ok(PricePoint { date, close })
            })
            .collect::<Result<Vec<_>>>()?;

        let cutoff = Utc::now().date_naive() - Duration::days(i64::from(lookback_days));
        let series = PriceSeries::from_points(points).since(cutoff);
        if series.is_empty() {
            bail!("Alpha Vantage returned no closes for {}", self.symbol);
        }
        Ok(series)
    }
}

#[async_trait]
impl PriceSource for AlphaVantageProvider {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(name = "AlphaVantageQuote", skip(self), fields(symbol = %self.symbol))]
    async fn fetch_quote(&self) -> Result<Quote, ProviderError> {
        self.quote()
            .await
            .map_err(|e| ProviderError::from_anyhow(NAME, e))
    }

    #[instrument(name = "AlphaVantageDaily", skip(self), fields(symbol = %self.symbol))]
    async fn fetch_daily_series(&self, lookback_days: u32) -> Result<PriceSeries, ProviderError> {
        self.daily_series(lookback_days)
            .await
            .map_err(|e| ProviderError::from_anyhow(NAME, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(function: &str, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", function))
            .and(query_param("symbol", "SPY"))
            .and(query_param("apikey", "demo"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn provider(server: &MockServer) -> AlphaVantageProvider {
        AlphaVantageProvider::new(&server.uri(), Some("demo".to_string()), "SPY")
    }

    fn day(days_ago: i64) -> String {
        (Utc::now().date_naive() - Duration::days(days_ago))
            .format("%Y-%m-%d")
            .to_string()
    }

    #[tokio::test]
    async fn test_successful_quote_fetch() {
        let body = r#"{"Global Quote": {"01. symbol": "SPY", "05. price": "512.3400"}}"#;
        let server = create_mock_server("GLOBAL_QUOTE", body).await;
        let quote = provider(&server).fetch_quote().await.unwrap();
        assert_eq!(quote.close, dec!(512.34));
    }

    #[tokio::test]
    async fn test_empty_global_quote_is_error() {
        let server = create_mock_server("GLOBAL_QUOTE", r#"{"Global Quote": {}}"#).await;
        let err = provider(&server).fetch_quote().await.unwrap_err();
        assert_eq!(err.cause, "Alpha Vantage: missing 'Global Quote' price");
    }

    #[tokio::test]
    async fn test_daily_series_sorted_and_trimmed() {
        let body = format!(
            r#"{{
                "Meta Data": {{"2. Symbol": "SPY"}},
                "Time Series (Daily)": {{
                    "{}": {{"1. open": "1", "4. close": "505.10"}},
                    "{}": {{"1. open": "1", "4. close": "500.00"}},
                    "{}": {{"1. open": "1", "4. close": "400.00"}}
                }}
            }}"#,
            day(1),
            day(3),
            day(400)
        );
        let server = create_mock_server("TIME_SERIES_DAILY", &body).await;

        let series = provider(&server).fetch_daily_series(120).await.unwrap();
        let closes: Vec<Decimal> = series.points().iter().map(|p| p.close).collect();
        assert_eq!(closes, vec![dec!(500.00), dec!(505.10)]);
    }

    #[tokio::test]
    async fn test_rate_limit_note_is_surfaced() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
        let server = create_mock_server("TIME_SERIES_DAILY", body).await;
        let err = provider(&server).fetch_daily_series(120).await.unwrap_err();
        assert_eq!(err.provider, "alpha_vantage");
        assert!(err.cause.starts_with("Alpha Vantage note: Thank you for using Alpha Vantage!"));
    }

    #[tokio::test]
    async fn test_information_message_is_surfaced() {
        let body = r#"{"Information": "The **demo** API key is for demo purposes only."}"#;
        let server = create_mock_server("GLOBAL_QUOTE", body).await;
        let err = provider(&server).fetch_quote().await.unwrap_err();
        assert_eq!(
            err.cause,
            "Alpha Vantage info: The **demo** API key is for demo purposes only."
        );
    }

    #[tokio::test]
    async fn test_missing_series_is_error() {
        let server = create_mock_server("TIME_SERIES_DAILY", r#"{"Meta Data": {}}"#).await;
        let err = provider(&server).fetch_daily_series(120).await.unwrap_err();
        assert_eq!(err.cause, "Alpha Vantage: missing 'Time Series (Daily)'");
    }

    #[tokio::test]
    async fn test_http_error_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(503).set_body_string(" upstream unavailable "))
            .mount(&server)
            .await;
        let err = provider(&server).fetch_quote().await.unwrap_err();
        assert_eq!(
            err.cause,
            "Alpha Vantage: HTTP 503 Service Unavailable upstream unavailable"
        );
    }

    #[tokio::test]
    async fn test_missing_key() {
        let provider = AlphaVantageProvider::new("http://localhost:1", None, "SPY");
        let err = provider.fetch_daily_series(120).await.unwrap_err();
        assert_eq!(err.cause, "Missing ALPHA_VANTAGE_API_KEY");
    }
}
