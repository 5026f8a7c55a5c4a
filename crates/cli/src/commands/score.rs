//! Score command.
//!
//! Loads raw pool records, normalizes them, optionally replaces volatility
//! with ensemble forecasts from price histories, then scores and ranks.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use tracing::info;
use yield_risk_core::{CollateralConfig, EngineConfig, MarketDataSource, PoolRecord};
use yield_risk_data::{fetch_histories, normalize_all, FileMarketData};
use yield_risk_scoring::score_pools;
use yield_risk_selector::{PoolRanker, ReportFormatter, ScoringReport};
use yield_risk_volatility::{VolatilityForecast, VolatilityForecaster};

use super::config::load_config;

/// Arguments for the score command.
#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    /// JSON file of raw pool records (array or `{"data": [...]}`)
    #[arg(short, long)]
    pub pools: PathBuf,

    /// Directory of `<SYMBOL>.csv` price histories used for ensemble forecasts
    #[arg(long)]
    pub prices_dir: Option<PathBuf>,

    /// Config file path (defaults to config/Engine.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Config profile layered on config/Engine.toml
    #[arg(long, env = "YIELD_RISK_PROFILE")]
    pub profile: Option<String>,

    /// Horizon in days
    #[arg(long)]
    pub horizon: Option<u32>,

    /// Number of pools to show
    #[arg(long)]
    pub top: Option<usize>,

    /// Annual baseline rate as a decimal (0.03 = 3%)
    #[arg(long)]
    pub baseline_apr: Option<f64>,

    /// Current collateral ratio of a live position (enables modeled liquidation)
    #[arg(long, requires = "liquidation_ratio")]
    pub current_ratio: Option<f64>,

    /// Liquidation ratio of the live position
    #[arg(long, requires = "current_ratio")]
    pub liquidation_ratio: Option<f64>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Print per-pool score components after the table
    #[arg(long)]
    pub breakdown: bool,
}

impl ScoreArgs {
    fn apply_overrides(&self, config: &mut EngineConfig) {
        if let Some(horizon) = self.horizon {
            config.horizon_days = horizon;
        }
        if let Some(top) = self.top {
            config.top_n = top;
        }
        if let Some(baseline) = self.baseline_apr {
            config.baseline_apr = baseline;
        }
        if let (Some(current_ratio), Some(liquidation_ratio)) =
            (self.current_ratio, self.liquidation_ratio)
        {
            config.collateral = Some(CollateralConfig {
                current_ratio,
                liquidation_ratio,
            });
        }
    }
}

/// Runs the score command.
///
/// # Errors
/// Returns an error if configuration is invalid or the pools file cannot be read.
pub async fn run_score(args: ScoreArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref(), args.profile.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    let mut source = FileMarketData::new(&args.pools);
    if let Some(dir) = &args.prices_dir {
        source = source.with_prices_dir(dir);
    }

    let raw = source
        .pool_records()
        .await
        .with_context(|| format!("Failed to read pools from {}", args.pools.display()))?;
    let batch = normalize_all(&raw);

    let forecasts = if args.prices_dir.is_some() {
        build_forecasts(&source, &batch.records, &config).await?
    } else {
        HashMap::new()
    };

    let (scored, summary) = score_pools(&batch.records, &forecasts, &config)?;
    let summary = summary.with_dropped(batch.dropped.len());
    let ranked = PoolRanker::from_config(&config).select(&scored);
    let report = ScoringReport::new(&config, summary, ranked);

    if args.json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    println!("{}", ReportFormatter::format(&report, &config));
    if args.breakdown {
        for pool in &report.pools {
            print!("{}", ReportFormatter::format_breakdown(pool));
        }
    }
    Ok(())
}

async fn build_forecasts(
    source: &FileMarketData,
    records: &[PoolRecord],
    config: &EngineConfig,
) -> Result<HashMap<String, VolatilityForecast>> {
    let symbols: Vec<String> = records
        .iter()
        .map(|r| r.symbol.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let histories = fetch_histories(source, &symbols).await;
    let forecaster = VolatilityForecaster::from_config(config)?;
    let now = Utc::now();

    let forecasts: HashMap<String, VolatilityForecast> = histories
        .iter()
        .map(|(symbol, series)| (symbol.clone(), forecaster.forecast_latest(series, now)))
        .collect();

    info!(forecasts = forecasts.len(), "Built ensemble forecasts");
    Ok(forecasts)
}
