//! Date-range scan over a provider's expiration list.
//!
//! Walks every listed expiration, keeps the ones inside the DTE
//! window, fetches each chain, and collects per-expiration metrics.
//! A failed chain fetch only skips that one expiration; the scan
//! degrades gracefully and reports how much it had to drop.

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::sentiment::{ExpirationMetrics, ScanConfig, SentimentAnalyzer};
use crate::data::OptionsProvider;

/// Result of a full scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Qualifying expirations, ascending by days to expiration.
    pub records: Vec<ExpirationMetrics>,

    /// Expirations inside the window whose chain fetch failed.
    pub skipped: usize,
}

/// Scans the provider's expiration list for one underlying.
///
/// Stateless across runs: every call is a pure function of the
/// provider's responses and the supplied inputs.
pub struct ExpirationScanner {
    config: ScanConfig,
    analyzer: SentimentAnalyzer,
}

impl ExpirationScanner {
    pub fn new(config: ScanConfig) -> Self {
        let analyzer = SentimentAnalyzer::new(config.atm_band);
        Self { config, analyzer }
    }

    /// Scan every listed expiration.
    ///
    /// Date strings that fail to parse are ignored outright (they are
    /// a provider formatting quirk, not a data failure, so they do not
    /// count as skips). Dates outside the window are ignored the same
    /// way. Only a failed chain fetch increments the skip count.
    pub async fn scan(
        &self,
        provider: &dyn OptionsProvider,
        ticker: &str,
        spot: f64,
        expirations: &[String],
        today: NaiveDate,
    ) -> ScanOutcome {
        let (min_dte, max_dte) = self.config.dte_window();
        let mut outcome = ScanOutcome::default();

        for raw in expirations {
            let date = match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(d) => d,
                Err(_) => continue,
            };

            let dte = (date - today).num_days();
            if dte < min_dte || dte > max_dte {
                debug!(expiration = %date, dte, "outside DTE window");
                continue;
            }

            let chain = match provider.fetch_chain(ticker, raw).await {
                Ok(chain) => chain,
                Err(e) => {
                    warn!(expiration = %date, error = %e, "chain fetch failed, skipping");
                    outcome.skipped += 1;
                    continue;
                }
            };

            outcome
                .records
                .push(self.analyzer.analyze(date, dte, &chain, spot));
        }

        outcome.records.sort_by_key(|r| r.dte);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use async_trait::async_trait;

    use super::*;
    use crate::data::{OptionChain, OptionRow, ProviderError};

    /// In-memory provider: canned chains keyed by expiration string,
    /// plus a set of expirations whose fetch always fails.
    struct FakeProvider {
        chains: HashMap<String, OptionChain>,
        failing: HashSet<String>,
    }

    impl FakeProvider {
        fn new(expirations: &[&str]) -> Self {
            let chains = expirations
                .iter()
                .map(|e| (e.to_string(), sample_chain()))
                .collect();
            Self {
                chains,
                failing: HashSet::new(),
            }
        }

        fn failing(mut self, expiration: &str) -> Self {
            self.failing.insert(expiration.to_string());
            self
        }
    }

    #[async_trait]
    impl crate::data::OptionsProvider for FakeProvider {
        async fn current_price(&self, _ticker: &str) -> Result<f64, ProviderError> {
            Ok(100.0)
        }

        async fn list_expirations(&self, _ticker: &str) -> Result<Vec<String>, ProviderError> {
            let mut dates: Vec<String> = self.chains.keys().cloned().collect();
            dates.sort();
            Ok(dates)
        }

        async fn fetch_chain(
            &self,
            ticker: &str,
            expiration: &str,
        ) -> Result<OptionChain, ProviderError> {
            if self.failing.contains(expiration) {
                return Err(ProviderError::Api("synthetic outage".to_string()));
            }
            self.chains
                .get(expiration)
                .cloned()
                .ok_or_else(|| ProviderError::NoChain {
                    ticker: ticker.to_string(),
                    expiration: expiration.to_string(),
                })
        }
    }

    fn sample_chain() -> OptionChain {
        let quote = |strike: f64| OptionRow {
            strike: Some(strike),
            volume: Some(10.0),
            open_interest: Some(50.0),
            implied_volatility: Some(0.25),
            ..OptionRow::default()
        };
        OptionChain {
            calls: vec![quote(95.0), quote(100.0)],
            puts: vec![quote(105.0)],
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn scanner(min_dte: i64, max_dte: i64) -> ExpirationScanner {
        ExpirationScanner::new(ScanConfig {
            min_dte,
            max_dte,
            ..ScanConfig::default()
        })
    }

    #[tokio::test]
    async fn test_window_excludes_without_counting() {
        // 3 days out is in the window, 30 days out is not
        let provider = FakeProvider::new(&["2024-01-13", "2024-02-09"]);
        let expirations = provider.list_expirations("TST").await.unwrap();

        let outcome = scanner(1, 5)
            .scan(&provider, "TST", 100.0, &expirations, today())
            .await;

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].dte, 3);
        assert_eq!(outcome.skipped, 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_counts_and_continues() {
        let provider =
            FakeProvider::new(&["2024-01-13", "2024-01-20"]).failing("2024-01-13");
        let expirations = provider.list_expirations("TST").await.unwrap();

        let outcome = scanner(1, 30)
            .scan(&provider, "TST", 100.0, &expirations, today())
            .await;

        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].dte, 10);
    }

    #[tokio::test]
    async fn test_unparseable_dates_are_silently_ignored() {
        let provider = FakeProvider::new(&["not-a-date", "2024-01-13"]);
        let expirations = provider.list_expirations("TST").await.unwrap();

        let outcome = scanner(1, 30)
            .scan(&provider, "TST", 100.0, &expirations, today())
            .await;

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.skipped, 0);
    }

    #[tokio::test]
    async fn test_reversed_bounds_behave_as_swapped() {
        let provider = FakeProvider::new(&["2024-01-13"]);
        let expirations = provider.list_expirations("TST").await.unwrap();

        let outcome = scanner(5, 1)
            .scan(&provider, "TST", 100.0, &expirations, today())
            .await;

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].dte, 3);
    }

    #[tokio::test]
    async fn test_records_sorted_by_dte() {
        let provider = FakeProvider::new(&["2024-02-02", "2024-01-13", "2024-01-20"]);
        // Hand the scanner the list deliberately out of order
        let expirations: Vec<String> = ["2024-02-02", "2024-01-13", "2024-01-20"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let outcome = scanner(1, 60)
            .scan(&provider, "TST", 100.0, &expirations, today())
            .await;

        let dtes: Vec<i64> = outcome.records.iter().map(|r| r.dte).collect();
        assert_eq!(dtes, vec![3, 10, 23]);
    }

    #[tokio::test]
    async fn test_all_fetches_failing_yields_no_records() {
        let provider = FakeProvider::new(&["2024-01-13", "2024-01-20"])
            .failing("2024-01-13")
            .failing("2024-01-20");
        let expirations = provider.list_expirations("TST").await.unwrap();

        let outcome = scanner(1, 30)
            .scan(&provider, "TST", 100.0, &expirations, today())
            .await;

        assert!(outcome.records.is_empty());
        assert_eq!(outcome.skipped, 2);
    }

    #[tokio::test]
    async fn test_fake_ticker_exists_via_default_impl() {
        let provider = FakeProvider::new(&["2024-01-13"]);
        assert!(provider.ticker_exists("TST").await);
    }
}
