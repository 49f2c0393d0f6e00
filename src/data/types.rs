//! Raw option-chain data as the market-data provider delivers it.
//!
//! Every numeric cell is optional: providers routinely omit volume or
//! open interest for illiquid strikes, and some fields arrive as
//! strings. Absent or unparseable cells decode to `None` so that "no
//! data" stays distinguishable from zero all the way through the
//! pipeline.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One contract quote for a single strike on one side of the chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionRow {
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub strike: Option<f64>,

    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub last_price: Option<f64>,

    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub bid: Option<f64>,

    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub ask: Option<f64>,

    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub volume: Option<f64>,

    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub open_interest: Option<f64>,

    /// Fractional decimal form, e.g. 0.21 for 21% annualized.
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub implied_volatility: Option<f64>,
}

/// Calls and puts for one expiration date.
///
/// Either side may be empty. That is a valid state, not an error:
/// downstream aggregation resolves it to undefined metrics.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionChain {
    #[serde(default)]
    pub calls: Vec<OptionRow>,

    #[serde(default)]
    pub puts: Vec<OptionRow>,
}

impl OptionChain {
    /// Total contract rows across both sides.
    pub fn len(&self) -> usize {
        self.calls.len() + self.puts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }
}

/// Accept a JSON number, a numeric string, or null; anything else is
/// treated as an absent cell.
fn de_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_cell(&value))
}

fn parse_cell(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
