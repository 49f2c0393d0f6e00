//! Sentiment analytics pipeline.
//!
//! Provides:
//! - Near-the-money table operations (band filter, tolerant sums,
//!   nearest-strike IV)
//! - Expiration cycle classification (weekly/monthly/quarterly)
//! - Per-expiration sentiment metrics and the date-range scanner

pub mod atm;
pub mod cycle;
pub mod scanner;
pub mod sentiment;

pub use atm::{filter_near_spot, nearest_implied_vol, sum_column};
pub use cycle::ExpirationCycle;
pub use scanner::{ExpirationScanner, ScanOutcome};
pub use sentiment::{ExpirationMetrics, ScanConfig, SentimentAnalyzer};
