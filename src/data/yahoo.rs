//! Yahoo Finance quote client.
//!
//! Talks to the public (unauthenticated) quote endpoints:
//! - `/v8/finance/chart/{ticker}` for recent daily closes and
//!   snapshot price fields
//! - `/v7/finance/options/{ticker}` for the expiration list and the
//!   per-expiration chain (one expiration per request)
//!
//! The endpoints reject requests without a browser-like User-Agent,
//! and slow responses are common off-hours, so the client carries a
//! request timeout rather than letting a hung call stall the run.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::provider::{OptionsProvider, ProviderError};
use super::types::{OptionChain, OptionRow};

/// Yahoo quote API base URL.
const BASE_URL: &str = "https://query2.finance.yahoo.com";

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Yahoo Finance market-data client.
pub struct YahooClient {
    client: Client,
}

impl YahooClient {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// GET helper that unwraps HTTP-level failures into [`ProviderError`].
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", BASE_URL, path);
        debug!(%url, "GET");

        let response = self.client.get(&url).query(params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!("{}: {}", status, text)));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("failed to parse response: {}", e)))
    }

    /// First chain result for a ticker, with or without a date filter.
    async fn options_result(
        &self,
        ticker: &str,
        date: Option<i64>,
    ) -> Result<Option<OptionsResult>, ProviderError> {
        let params: Vec<(&str, String)> = match date {
            Some(ts) => vec![("date", ts.to_string())],
            None => vec![],
        };

        let envelope: OptionsEnvelope = self
            .get_json(&format!("/v7/finance/options/{}", ticker), &params)
            .await?;

        Ok(envelope
            .option_chain
            .result
            .unwrap_or_default()
            .into_iter()
            .next())
    }
}

#[async_trait]
impl OptionsProvider for YahooClient {
    async fn current_price(&self, ticker: &str) -> Result<f64, ProviderError> {
        let envelope: ChartEnvelope = self
            .get_json(
                &format!("/v8/finance/chart/{}", ticker),
                &[("range", "5d".to_string()), ("interval", "1d".to_string())],
            )
            .await?;

        envelope
            .chart
            .result
            .unwrap_or_default()
            .first()
            .and_then(extract_price)
            .ok_or_else(|| ProviderError::PriceUnavailable {
                ticker: ticker.to_string(),
            })
    }

    async fn list_expirations(&self, ticker: &str) -> Result<Vec<String>, ProviderError> {
        let result = self.options_result(ticker, None).await?;

        Ok(result
            .map(|r| {
                r.expiration_dates
                    .iter()
                    .copied()
                    .filter_map(format_expiration)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_chain(
        &self,
        ticker: &str,
        expiration: &str,
    ) -> Result<OptionChain, ProviderError> {
        let ts = expiration_timestamp(expiration)?;

        let no_chain = || ProviderError::NoChain {
            ticker: ticker.to_string(),
            expiration: expiration.to_string(),
        };

        let result = self.options_result(ticker, Some(ts)).await?.ok_or_else(no_chain)?;
        let block = result.options.into_iter().next().ok_or_else(no_chain)?;

        Ok(OptionChain {
            calls: block.calls,
            puts: block.puts,
        })
    }
}

// --- response envelopes ---

#[derive(Debug, Clone, Deserialize)]
struct ChartEnvelope {
    chart: ChartOuter,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartOuter {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    chart_previous_close: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Clone, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsEnvelope {
    option_chain: OptionsOuter,
}

#[derive(Debug, Clone, Deserialize)]
struct OptionsOuter {
    #[serde(default)]
    result: Option<Vec<OptionsResult>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsResult {
    #[serde(default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    options: Vec<ChainBlock>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChainBlock {
    #[serde(default)]
    calls: Vec<OptionRow>,
    #[serde(default)]
    puts: Vec<OptionRow>,
}

/// Best available price from a chart result: most recent valid daily
/// close, then the regular-market price, then the previous close.
fn extract_price(result: &ChartResult) -> Option<f64> {
    if let Some(close) = last_close(result) {
        return Some(close);
    }

    [
        result.meta.regular_market_price,
        result.meta.chart_previous_close,
    ]
    .into_iter()
    .flatten()
    .find(|p| *p > 0.0)
}

/// Most recent non-null positive close in the chart window.
fn last_close(result: &ChartResult) -> Option<f64> {
    let quote = result.indicators.as_ref()?.quote.first()?;
    quote.close.iter().rev().flatten().copied().find(|c| *c > 0.0)
}

/// Unix timestamp (midnight UTC) for a `YYYY-MM-DD` expiration string,
/// the form the options endpoint keys chains by.
fn expiration_timestamp(expiration: &str) -> Result<i64, ProviderError> {
    let date = NaiveDate::parse_from_str(expiration, "%Y-%m-%d").map_err(|e| {
        ProviderError::InvalidResponse(format!("bad expiration date {}: {}", expiration, e))
    })?;
    Ok(date.and_time(NaiveTime::MIN).and_utc().timestamp())
}

/// Render a provider expiration timestamp back to `YYYY-MM-DD`.
fn format_expiration(ts: i64) -> Option<String> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
}
