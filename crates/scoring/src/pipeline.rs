//! Batch scoring of normalized pools.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};
use yield_risk_core::pool::clamp_volatility;
use yield_risk_core::{ConfigError, EngineConfig, PoolRecord, ScoredPool, VolatilitySource};
use yield_risk_volatility::VolatilityForecast;

use crate::score::ScoreCalculator;

/// Counts describing one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoringSummary {
    /// Records handed to the scorer.
    pub input: usize,
    pub scored: usize,
    /// Records lacking apy or volatility.
    pub unscored: usize,
    /// Raw records dropped before scoring by the normalizer.
    pub dropped: usize,
    /// Pools whose volatility came from a price-history forecast.
    pub forecast_overrides: usize,
}

impl ScoringSummary {
    #[must_use]
    pub fn with_dropped(mut self, dropped: usize) -> Self {
        self.dropped = dropped;
        self
    }
}

/// Replaces a pool's volatility with its symbol's ensemble forecast.
///
/// Forecasts built from too little history, or that are zero, are ignored.
/// The forecast is converted to percentage points and clamped like any
/// normalized volatility.
#[must_use]
pub fn apply_forecast(pool: &PoolRecord, forecast: &VolatilityForecast) -> Option<PoolRecord> {
    if forecast.is_insufficient()
        || !forecast.ensemble_vol.is_finite()
        || forecast.ensemble_vol <= 0.0
    {
        return None;
    }

    let mut updated = pool.clone();
    updated.volatility = Some(clamp_volatility(forecast.as_percentage_points()));
    updated.volatility_source = Some(VolatilitySource::EnsembleForecast);
    Some(updated)
}

/// Scores every pool, using forecasts where a pool's symbol has one.
///
/// Output keeps input order; ranking is a separate step.
///
/// # Errors
///
/// Returns [`ConfigError`] if the configuration fails validation. No pool
/// is scored in that case.
pub fn score_pools(
    records: &[PoolRecord],
    forecasts: &HashMap<String, VolatilityForecast>,
    config: &EngineConfig,
) -> Result<(Vec<ScoredPool>, ScoringSummary), ConfigError> {
    let calculator = ScoreCalculator::new(config)?;
    let mut summary = ScoringSummary {
        input: records.len(),
        ..Default::default()
    };

    let mut scored = Vec::with_capacity(records.len());
    for record in records {
        let forecasted = forecasts
            .get(&record.symbol)
            .and_then(|forecast| apply_forecast(record, forecast));

        let pool = match &forecasted {
            Some(updated) => {
                summary.forecast_overrides += 1;
                debug!(
                    symbol = %record.symbol,
                    from = ?record.volatility,
                    to = ?updated.volatility,
                    "Using ensemble forecast volatility"
                );
                updated
            }
            None => record,
        };

        match calculator.score(pool) {
            Some(result) => scored.push(result),
            None => summary.unscored += 1,
        }
    }
    summary.scored = scored.len();

    info!(
        input = summary.input,
        scored = summary.scored,
        unscored = summary.unscored,
        forecast_overrides = summary.forecast_overrides,
        horizon_days = config.horizon_days,
        "Scored pools"
    );
    Ok((scored, summary))
}
