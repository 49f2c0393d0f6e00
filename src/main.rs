//! Near-the-money options sentiment scanner.
//!
//! Pulls every qualifying option chain for one underlying from Yahoo
//! Finance and prints put/call volume and open-interest ratios plus
//! the ATM implied volatility per expiration.
//!
//! ```bash
//! # Fully specified
//! pcr-scan --ticker SPY --min-dte 1 --max-dte 180
//!
//! # Or run bare and answer the prompts
//! pcr-scan
//! ```

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use pcr_scan::{ExpirationMetrics, ExpirationScanner, OptionsProvider, ScanConfig, YahooClient};

/// ATM options sentiment scanner CLI.
#[derive(Parser)]
#[command(name = "pcr-scan")]
#[command(about = "Put/call sentiment metrics for near-the-money option chains")]
#[command(version)]
struct Cli {
    /// Underlying ticker symbol (prompted for when omitted)
    #[arg(short, long)]
    ticker: Option<String>,

    /// Minimum days to expiration, inclusive
    #[arg(long)]
    min_dte: Option<i64>,

    /// Maximum days to expiration, inclusive
    #[arg(long)]
    max_dte: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pcr_scan=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let ticker = match cli.ticker {
        Some(t) => t.trim().to_uppercase(),
        None => prompt("enter ticker: ")?.to_uppercase(),
    };
    if ticker.is_empty() {
        println!("ticker NF");
        return Ok(());
    }

    let client = YahooClient::new().context("failed to build HTTP client")?;

    if !client.ticker_exists(&ticker).await {
        println!("ticker NF");
        return Ok(());
    }

    let min_dte = match cli.min_dte {
        Some(v) => v.max(0),
        None => parse_dte(&prompt("min days to expiration [1]: ")?, 1),
    };
    let max_dte = match cli.max_dte {
        Some(v) => v.max(0),
        None => parse_dte(&prompt("max days to expiration [180]: ")?, 180),
    };

    let spot = match client.current_price(&ticker).await {
        Ok(p) => p,
        Err(_) => {
            println!("spot price unavailable");
            return Ok(());
        }
    };

    let expirations = client.list_expirations(&ticker).await.unwrap_or_default();
    if expirations.is_empty() {
        println!("no options available");
        return Ok(());
    }

    let config = ScanConfig {
        min_dte,
        max_dte,
        ..ScanConfig::default()
    };
    let scanner = ExpirationScanner::new(config);
    let today = Utc::now().date_naive();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!(
        "scanning {} expirations for {}",
        expirations.len(),
        ticker
    ));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let outcome = scanner
        .scan(&client, &ticker, spot, &expirations, today)
        .await;
    spinner.finish_and_clear();

    if outcome.records.is_empty() {
        println!("valid option data NF");
        return Ok(());
    }

    print_table(&outcome.records);

    if outcome.skipped > 0 {
        println!(
            "\nwarning: skipped {} expirations (data unavailable)",
            outcome.skipped
        );
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Parse a DTE bound: empty or non-numeric input falls back to the
/// default, negative values clamp to zero.
fn parse_dte(input: &str, default: i64) -> i64 {
    let s = input.trim();
    if s.is_empty() {
        return default;
    }
    s.parse::<i64>().map(|v| v.max(0)).unwrap_or(default)
}

fn print_table(records: &[ExpirationMetrics]) {
    println!(
        "{:<12} {:>5} {:>10} {:>13} {:>12} {:>11} {:>10} {:>11}",
        "expiration",
        "dte",
        "cycle",
        "call_vol_atm",
        "put_vol_atm",
        "pc_vol_atm",
        "pc_oi_atm",
        "atm_iv_dec"
    );

    for r in records {
        println!(
            "{:<12} {:>5} {:>10} {:>13} {:>12} {:>11} {:>10} {:>11}",
            r.expiration,
            r.dte,
            r.cycle.as_str(),
            fmt_opt(r.call_volume, 0),
            fmt_opt(r.put_volume, 0),
            fmt_opt(r.put_call_volume, 4),
            fmt_opt(r.put_call_open_interest, 4),
            fmt_opt(r.atm_iv, 4),
        );
    }
}

/// Render an aggregate, keeping undefined values visibly undefined.
fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "NaN".to_string(),
    }
}
