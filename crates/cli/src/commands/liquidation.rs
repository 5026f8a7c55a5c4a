//! Liquidation command.
//!
//! Prints the probability that a collateralized position is liquidated
//! within each requested horizon.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use yield_risk_scoring::LiquidationModel;
use yield_risk_selector::ReportFormatter;

use super::config::load_config;

/// Arguments for the liquidation command.
#[derive(Args, Debug, Clone)]
pub struct LiquidationArgs {
    /// Current collateral ratio (2.0 = 200%)
    #[arg(long)]
    pub current_ratio: f64,

    /// Ratio at which the position is liquidated
    #[arg(long)]
    pub liquidation_ratio: f64,

    /// Annualized collateral volatility as a decimal (0.6 = 60%)
    #[arg(long)]
    pub volatility: f64,

    /// Horizons in days (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "1,7,30,90")]
    pub days: Vec<f64>,

    /// Config file path (defaults to config/Engine.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Runs the liquidation command.
///
/// # Errors
/// Returns an error if configuration is invalid or the position cannot be assessed.
pub fn run_liquidation(args: &LiquidationArgs) -> Result<()> {
    let config = load_config(args.config.as_deref(), None)?;
    let model = LiquidationModel::from_config(&config).context("Invalid configuration")?;

    let assessments = model
        .assess_horizons(
            args.current_ratio,
            args.liquidation_ratio,
            args.volatility,
            &args.days,
        )
        .context("Cannot assess liquidation risk")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&assessments)?);
    } else {
        print!(
            "{}",
            ReportFormatter::format_liquidation(
                args.current_ratio,
                args.liquidation_ratio,
                args.volatility,
                &assessments,
            )
        );
    }
    Ok(())
}
