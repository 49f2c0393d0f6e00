pub mod analytics;
pub mod data;

// Re-export commonly used types
pub use analytics::{
    ExpirationCycle, ExpirationMetrics, ExpirationScanner, ScanConfig, ScanOutcome,
    SentimentAnalyzer,
};
pub use data::{OptionChain, OptionRow, OptionsProvider, ProviderError, YahooClient};
