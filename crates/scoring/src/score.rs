//! Risk-adjusted yield score.
//!
//! ```text
//! S = ((APR_Δ(pool) − APR_Δ(baseline) − L) / max(σ_Δ, ε)) × H
//! L = p_Δ × emergency_haircut
//! H = 1 − |assumed_correlation|
//! ```
//!
//! `p_Δ` is either the configured flat probability mapped onto the horizon,
//! or, when a collateral position is configured, the modeled liquidation
//! probability of that position at the pool's volatility.

use tracing::{debug, warn};
use yield_risk_core::{
    CollateralConfig, ConfigError, EngineConfig, PoolRecord, ScoreComponents, ScoredPool,
};

use crate::horizon::{horizon_liquidation_probability, horizon_return, horizon_volatility};
use crate::liquidation::LiquidationModel;

/// Where the horizon liquidation probability comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiquidationSource {
    /// Configured flat probability, mapped per its basis.
    Flat,
    /// Modeled from a live collateral position.
    Modeled(CollateralConfig),
}

/// Scores pools under one engine configuration.
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    config: EngineConfig,
    model: LiquidationModel,
    source: LiquidationSource,
}

impl ScoreCalculator {
    /// Creates a calculator for a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration fails validation.
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        let model = LiquidationModel::from_config(config)?;
        let source = config
            .collateral
            .map_or(LiquidationSource::Flat, LiquidationSource::Modeled);
        Ok(Self {
            config: config.clone(),
            model,
            source,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn liquidation_source(&self) -> LiquidationSource {
        self.source
    }

    /// Horizon liquidation probability for a pool of the given volatility.
    ///
    /// A modeled position that cannot be assessed falls back to the flat
    /// probability.
    #[must_use]
    pub fn liquidation_probability(&self, volatility_pct: f64, days: f64) -> f64 {
        let flat = || {
            horizon_liquidation_probability(
                self.config.liquidation_probability,
                self.config.liquidation_basis,
                days,
            )
        };

        match self.source {
            LiquidationSource::Flat => flat(),
            LiquidationSource::Modeled(collateral) => match self.model.assess(
                collateral.current_ratio,
                collateral.liquidation_ratio,
                volatility_pct / 100.0,
                days,
            ) {
                Ok(assessment) => assessment.probability,
                Err(e) => {
                    warn!(error = %e, "Liquidation model rejected position, using flat probability");
                    flat()
                }
            },
        }
    }

    /// Scores one pool over the configured horizon.
    ///
    /// Returns `None` when the pool lacks a finite `apy` or `volatility`.
    #[must_use]
    pub fn score(&self, pool: &PoolRecord) -> Option<ScoredPool> {
        let (apy, volatility) = match (pool.apy, pool.volatility) {
            (Some(apy), Some(vol)) if apy.is_finite() && vol.is_finite() => (apy, vol),
            _ => {
                debug!(symbol = %pool.symbol, "Pool lacks apy or volatility, not scored");
                return None;
            }
        };

        let days = self.config.horizon();
        let p = self.liquidation_probability(volatility, days);
        let (risk_adjusted_score, mut components) =
            risk_adjusted_score(apy, volatility, days, p, &self.config);
        components.delta = self.config.horizon_days;

        Some(ScoredPool {
            pool: pool.clone(),
            risk_adjusted_score,
            score_components: components,
        })
    }
}

/// Computes the score and its components for raw inputs.
///
/// `days` may be fractional; `liquidation_probability` is already a
/// horizon probability. The returned components carry `delta` rounded to
/// whole days.
#[must_use]
pub fn risk_adjusted_score(
    apy: f64,
    volatility_pct: f64,
    days: f64,
    liquidation_probability: f64,
    config: &EngineConfig,
) -> (f64, ScoreComponents) {
    let apr_horizon = horizon_return(apy, days);
    let baseline_apr_horizon = horizon_return(config.baseline_apr, days);
    let downside_volatility = horizon_volatility(volatility_pct, days);
    let liquidation_loss = liquidation_probability * config.emergency_haircut;
    let correlation_haircut = 1.0 - config.assumed_correlation.abs();

    let numerator = apr_horizon - baseline_apr_horizon - liquidation_loss;
    let score = numerator / downside_volatility.max(config.volatility_floor) * correlation_haircut;

    let components = ScoreComponents {
        apr_horizon,
        baseline_apr_horizon,
        downside_volatility,
        liquidation_loss,
        correlation_haircut,
        numerator,
        delta: rounded_days(days),
    };
    (score, components)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rounded_days(days: f64) -> u32 {
    days.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Scores one pool with a fresh calculator.
///
/// # Errors
///
/// Returns [`ConfigError`] if the configuration fails validation.
pub fn score_pool(
    pool: &PoolRecord,
    config: &EngineConfig,
) -> Result<Option<ScoredPool>, ConfigError> {
    Ok(ScoreCalculator::new(config)?.score(pool))
}
