//! Forecast command.
//!
//! Builds the ensemble volatility forecast for one price history CSV.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use std::path::PathBuf;
use yield_risk_data::parse_price_csv;
use yield_risk_selector::ReportFormatter;
use yield_risk_volatility::VolatilityForecaster;

use super::config::load_config;

/// Arguments for the forecast command.
#[derive(Args, Debug, Clone)]
pub struct ForecastArgs {
    /// Price history CSV with a `timestamp,price` header
    #[arg(long)]
    pub prices: PathBuf,

    /// Label for the report (defaults to the file stem)
    #[arg(long)]
    pub symbol: Option<String>,

    /// Horizon in days for the scaled forecast
    #[arg(long)]
    pub horizon: Option<u32>,

    /// As-of date in RFC 3339 format (defaults to the last observation)
    #[arg(long)]
    pub as_of: Option<String>,

    /// Config file path (defaults to config/Engine.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Runs the forecast command.
///
/// # Errors
/// Returns an error if the price file cannot be read or parsed.
pub async fn run_forecast(args: ForecastArgs) -> Result<()> {
    let config = load_config(args.config.as_deref(), None)?;
    let horizon = args.horizon.unwrap_or(config.horizon_days);

    let text = tokio::fs::read_to_string(&args.prices)
        .await
        .with_context(|| format!("Failed to read {}", args.prices.display()))?;
    let series = parse_price_csv(&text)
        .with_context(|| format!("Invalid price history in {}", args.prices.display()))?;

    let as_of = match &args.as_of {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map_err(|e| anyhow!("Invalid --as-of '{raw}': {e}"))?
            .with_timezone(&Utc),
        None => series.last_timestamp().unwrap_or_else(Utc::now),
    };

    let forecast = VolatilityForecaster::from_config(&config)
        .context("Invalid configuration")?
        .forecast(&series, as_of);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
        return Ok(());
    }

    let symbol = args.symbol.clone().unwrap_or_else(|| {
        args.prices
            .file_stem()
            .map_or_else(|| "UNKNOWN".to_string(), |s| s.to_string_lossy().into_owned())
    });
    print!(
        "{}",
        ReportFormatter::format_forecast(&symbol, &forecast, f64::from(horizon))
    );
    Ok(())
}
