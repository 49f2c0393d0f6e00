//! Near-the-money table operations.
//!
//! Leaf helpers over raw option rows: the strike band filter, tolerant
//! column sums, and the nearest-strike IV lookup. All of them treat an
//! absent cell as missing data, never as zero.

use crate::data::OptionRow;

/// Restrict rows to strikes within `band` of the spot price.
///
/// The interval is closed on both ends: a strike exactly at
/// `spot * (1 - band)` or `spot * (1 + band)` is kept. Rows without a
/// parsed strike are dropped. Filtering an already-filtered table is a
/// no-op.
pub fn filter_near_spot(rows: &[OptionRow], spot: f64, band: f64) -> Vec<OptionRow> {
    let lo = spot * (1.0 - band);
    let hi = spot * (1.0 + band);

    rows.iter()
        .filter(|row| row.strike.map(|s| s >= lo && s <= hi).unwrap_or(false))
        .cloned()
        .collect()
}

/// Sum one numeric column, tolerating absent cells.
///
/// Returns `None` when no cell is present at all, which keeps "no
/// data" distinguishable from a genuine zero total.
pub fn sum_column<F>(rows: &[OptionRow], cell: F) -> Option<f64>
where
    F: Fn(&OptionRow) -> Option<f64>,
{
    let mut total = None;
    for value in rows.iter().filter_map(cell) {
        *total.get_or_insert(0.0) += value;
    }
    total
}

/// Implied volatility at the strike closest to spot.
///
/// A row qualifies only with a parsed strike and a strictly positive
/// IV; non-positive IVs are stale-quote artifacts that would bias the
/// ATM estimate. Equidistant strikes resolve to the lower strike.
pub fn nearest_implied_vol(rows: &[OptionRow], spot: f64) -> Option<f64> {
    let mut best: Option<(f64, f64, f64)> = None; // (distance, strike, iv)

    for row in rows {
        let (strike, iv) = match (row.strike, row.implied_volatility) {
            (Some(s), Some(iv)) if iv > 0.0 => (s, iv),
            _ => continue,
        };

        let distance = (strike - spot).abs();
        let closer = match best {
            None => true,
            Some((best_distance, best_strike, _)) => {
                distance < best_distance || (distance == best_distance && strike < best_strike)
            }
        };
        if closer {
            best = Some((distance, strike, iv));
        }
    }

    best.map(|(_, _, iv)| iv)
}
