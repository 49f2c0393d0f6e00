//! Market-data provider capability.
//!
//! The analytics pipeline only ever talks to this trait, so the whole
//! scan can run against an in-memory fake in tests without touching
//! the network.

use async_trait::async_trait;
use thiserror::Error;

use super::types::OptionChain;

/// Provider errors.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("No usable price for {ticker}")]
    PriceUnavailable { ticker: String },

    #[error("No option chain for {ticker} expiring {expiration}")]
    NoChain { ticker: String, expiration: String },
}

/// Quote source for one underlying: spot price, listed expirations,
/// and per-expiration option chains.
#[async_trait]
pub trait OptionsProvider {
    /// Current price of the underlying.
    ///
    /// Implementations fall back through secondary quote fields and
    /// return the first usable positive number, or
    /// [`ProviderError::PriceUnavailable`] once every source is
    /// exhausted.
    async fn current_price(&self, ticker: &str) -> Result<f64, ProviderError>;

    /// Listed expiration dates as `YYYY-MM-DD` strings, possibly empty.
    async fn list_expirations(&self, ticker: &str) -> Result<Vec<String>, ProviderError>;

    /// Full chain (calls and puts) for one expiration date.
    async fn fetch_chain(&self, ticker: &str, expiration: &str)
        -> Result<OptionChain, ProviderError>;

    /// Whether the provider knows the ticker at all: a live price or
    /// at least one listed expiration counts. Provider errors are
    /// swallowed; this is a pre-flight check, not a data path.
    async fn ticker_exists(&self, ticker: &str) -> bool {
        if self.current_price(ticker).await.is_ok() {
            return true;
        }
        matches!(self.list_expirations(ticker).await, Ok(dates) if !dates.is_empty())
    }
}
