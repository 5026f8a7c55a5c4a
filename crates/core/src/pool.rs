//! Canonical pool records and their scored form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower bound of a plausible annualized volatility, in percentage points.
pub const MIN_VOLATILITY_PCT: f64 = 0.5;
/// Upper bound of a plausible annualized volatility, in percentage points.
pub const MAX_VOLATILITY_PCT: f64 = 300.0;

/// Clamps a volatility (percentage points) into the plausible band.
#[must_use]
pub fn clamp_volatility(volatility_pct: f64) -> f64 {
    volatility_pct.clamp(MIN_VOLATILITY_PCT, MAX_VOLATILITY_PCT)
}

/// Provenance of a pool's volatility figure. Diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilitySource {
    /// Annualized from a 7-day price change.
    CalculatedFromPrice,
    /// Volume/TVL turnover proxy.
    VolumeTvlEstimation,
    /// Flat default for single-sided stablecoin pools.
    StabilityPoolDefault,
    /// Replaced by an ensemble forecast from price history.
    EnsembleForecast,
    /// Taken from a volatility-like field of the raw record, named by the field.
    #[serde(untagged)]
    Field(String),
}

impl fmt::Display for VolatilitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, "{name}"),
            Self::CalculatedFromPrice => write!(f, "calculated_from_price"),
            Self::VolumeTvlEstimation => write!(f, "volume_tvl_estimation"),
            Self::StabilityPoolDefault => write!(f, "stability_pool_default"),
            Self::EnsembleForecast => write!(f, "ensemble_forecast"),
        }
    }
}

/// A pool after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRecord {
    /// Display label of the pool's underlying assets.
    pub symbol: String,
    /// Annual yield as a decimal fraction (0.10 = 10%).
    pub apy: Option<f64>,
    /// Annualized volatility in percentage points (10.0 = 10%).
    pub volatility: Option<f64>,
    pub volatility_source: Option<VolatilitySource>,
    pub tvl: Option<f64>,
    pub volume_usd_7d: Option<f64>,
    pub pool_id: Option<String>,
}

impl PoolRecord {
    /// Creates a record with only the fields the scorer needs.
    #[must_use]
    pub fn new(symbol: impl Into<String>, apy: f64, volatility_pct: f64) -> Self {
        Self {
            symbol: symbol.into(),
            apy: Some(apy),
            volatility: Some(volatility_pct),
            volatility_source: None,
            tvl: None,
            volume_usd_7d: None,
            pool_id: None,
        }
    }
}

/// Intermediate values of a risk-adjusted score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponents {
    /// Pool return compounded over the horizon.
    pub apr_horizon: f64,
    /// Baseline return compounded over the horizon.
    pub baseline_apr_horizon: f64,
    /// Annual volatility scaled to the horizon (before flooring).
    pub downside_volatility: f64,
    /// Expected loss from a forced unwind within the horizon.
    pub liquidation_loss: f64,
    pub correlation_haircut: f64,
    /// `apr_horizon − baseline_apr_horizon − liquidation_loss`.
    pub numerator: f64,
    /// Horizon in days.
    pub delta: u32,
}

/// A pool with its risk-adjusted score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredPool {
    #[serde(flatten)]
    pub pool: PoolRecord,
    pub risk_adjusted_score: f64,
    pub score_components: ScoreComponents,
}

impl ScoredPool {
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.pool.symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_volatility_bounds() {
        assert!((clamp_volatility(0.01) - MIN_VOLATILITY_PCT).abs() < f64::EPSILON);
        assert!((clamp_volatility(1_000.0) - MAX_VOLATILITY_PCT).abs() < f64::EPSILON);
        assert!((clamp_volatility(42.0) - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn volatility_source_serializes_as_tag() {
        assert_eq!(
            serde_json::to_string(&VolatilitySource::CalculatedFromPrice).unwrap(),
            r#""calculated_from_price""#
        );
        assert_eq!(
            serde_json::to_string(&VolatilitySource::Field("il7d".to_string())).unwrap(),
            r#""il7d""#
        );
        assert_eq!(VolatilitySource::VolumeTvlEstimation.to_string(), "volume_tvl_estimation");
    }

    #[test]
    fn scored_pool_flattens_record() {
        let scored = ScoredPool {
            pool: PoolRecord::new("A", 0.12, 20.0),
            risk_adjusted_score: 1.5,
            score_components: ScoreComponents {
                apr_horizon: 0.002,
                baseline_apr_horizon: 0.0005,
                downside_volatility: 0.03,
                liquidation_loss: 0.0001,
                correlation_haircut: 0.7,
                numerator: 0.0014,
                delta: 7,
            },
        };

        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["symbol"], "A");
        assert_eq!(json["riskAdjustedScore"], 1.5);
        assert_eq!(json["scoreComponents"]["delta"], 7);
    }
}
