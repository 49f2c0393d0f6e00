//! Per-expiration sentiment metrics.
//!
//! One chain in, one metrics record out: band-filter both sides,
//! aggregate volume and open interest, derive put/call ratios, and
//! average the two nearest-strike IVs into a single ATM estimate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::atm::{filter_near_spot, nearest_implied_vol, sum_column};
use super::cycle::ExpirationCycle;
use crate::data::OptionChain;

/// Scan configuration.
///
/// The defaults are the tool's global knobs: a 10% strike band around
/// spot and a 1-180 day expiration window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Strike band around spot, as a fraction of spot.
    pub atm_band: f64,

    /// Minimum days to expiration, inclusive.
    pub min_dte: i64,

    /// Maximum days to expiration, inclusive.
    pub max_dte: i64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            atm_band: 0.10,
            min_dte: 1,
            max_dte: 180,
        }
    }
}

impl ScanConfig {
    /// DTE window with reversed bounds swapped back into order.
    ///
    /// Guards only against the operator typing the two numbers in the
    /// wrong order; other malformed values are the operator's problem.
    pub fn dte_window(&self) -> (i64, i64) {
        if self.min_dte > self.max_dte {
            (self.max_dte, self.min_dte)
        } else {
            (self.min_dte, self.max_dte)
        }
    }
}

/// Sentiment metrics for one expiration.
///
/// Every aggregate is `Some` only when the underlying data existed;
/// a missing column or an all-absent band never shows up as zero.
#[derive(Debug, Clone, Serialize)]
pub struct ExpirationMetrics {
    pub expiration: NaiveDate,
    pub dte: i64,
    pub cycle: ExpirationCycle,
    pub call_volume: Option<f64>,
    pub put_volume: Option<f64>,
    pub put_call_volume: Option<f64>,
    pub put_call_open_interest: Option<f64>,
    pub atm_iv: Option<f64>,
}

/// Computes ATM sentiment metrics for a single expiration's chain.
pub struct SentimentAnalyzer {
    atm_band: f64,
}

impl SentimentAnalyzer {
    pub fn new(atm_band: f64) -> Self {
        Self { atm_band }
    }

    /// Analyze one chain against the spot price.
    ///
    /// Pure function of its inputs: no side effects, same record for
    /// the same chain and spot.
    pub fn analyze(
        &self,
        expiration: NaiveDate,
        dte: i64,
        chain: &OptionChain,
        spot: f64,
    ) -> ExpirationMetrics {
        let calls = filter_near_spot(&chain.calls, spot, self.atm_band);
        let puts = filter_near_spot(&chain.puts, spot, self.atm_band);

        let call_volume = sum_column(&calls, |r| r.volume);
        let put_volume = sum_column(&puts, |r| r.volume);
        let call_oi = sum_column(&calls, |r| r.open_interest);
        let put_oi = sum_column(&puts, |r| r.open_interest);

        let call_iv = nearest_implied_vol(&calls, spot);
        let put_iv = nearest_implied_vol(&puts, spot);

        ExpirationMetrics {
            expiration,
            dte,
            cycle: ExpirationCycle::classify(expiration),
            call_volume,
            put_volume,
            put_call_volume: ratio(put_volume, call_volume),
            put_call_open_interest: ratio(put_oi, call_oi),
            atm_iv: mean_defined(call_iv, put_iv),
        }
    }
}

/// Put/call ratio, defined only when both sides are present and the
/// call side is non-zero. Division by an undefined or zero call
/// aggregate would masquerade as a sentiment signal.
fn ratio(put: Option<f64>, call: Option<f64>) -> Option<f64> {
    match (put, call) {
        (Some(p), Some(c)) if c != 0.0 => Some(p / c),
        _ => None,
    }
}

/// Mean of whichever sides are defined.
fn mean_defined(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some((x + y) / 2.0),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}
