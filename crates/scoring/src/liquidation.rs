//! Probability that a collateralized position hits its liquidation ratio.
//!
//! Collateral value is modeled as a driftless geometric Brownian motion over
//! the horizon. The position is liquidated when value falls by
//! `required_drop = (current − liquidation) / current`:
//!
//! ```text
//! T          = days / 365
//! scaled_vol = σ·√T                  (floored at 1e-12)
//! drift      = −½·σ²·T
//! z          = (ln(1 − required_drop) − drift) / scaled_vol
//! p          = Φ(z)
//! ```
//!
//! Within the at-threshold band around the liquidation ratio, `p` is raised
//! to at least the configured at-threshold probability.

use serde::{Deserialize, Serialize};
use tracing::debug;
use yield_risk_core::stats::{normal_cdf, year_fraction};
use yield_risk_core::{ConfigError, EngineConfig, LiquidationError};

/// Floor of `σ√T` so that zero volatility yields `p → 0` instead of `NaN`.
pub const MIN_SCALED_VOLATILITY: f64 = 1e-12;

/// Result of one liquidation probability query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidationAssessment {
    /// Probability of liquidation within the horizon, in [0, 1].
    pub probability: f64,
    /// Fractional fall in collateral value that triggers liquidation.
    pub required_drop: f64,
    pub z_score: f64,
    /// `σ√T` after flooring.
    pub scaled_volatility: f64,
    /// True when the position sat on its liquidation ratio, where the
    /// configured at-threshold probability acts as a floor.
    pub at_threshold: bool,
    pub days: f64,
}

/// Liquidation probability model with its at-threshold policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidationModel {
    at_threshold_probability: f64,
    /// Relative band around the liquidation ratio.
    at_threshold_tolerance: f64,
}

impl Default for LiquidationModel {
    fn default() -> Self {
        Self {
            at_threshold_probability: 0.5,
            at_threshold_tolerance: 0.001,
        }
    }
}

impl LiquidationModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the model from the at-threshold policy of a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration fails validation.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            at_threshold_probability: config.at_threshold_probability,
            at_threshold_tolerance: config.at_threshold_tolerance,
        })
    }

    #[must_use]
    pub fn with_at_threshold_probability(mut self, probability: f64) -> Self {
        self.at_threshold_probability = probability;
        self
    }

    /// Assesses one position over one horizon.
    ///
    /// `volatility` is annualized as a decimal fraction (0.60 = 60%).
    ///
    /// # Errors
    ///
    /// Returns [`LiquidationError`] if a ratio is non-positive or non-finite,
    /// volatility is negative or non-finite, `days` is not positive, or the
    /// position is already below its liquidation ratio.
    ///
    /// # Examples
    ///
    /// ```
    /// use yield_risk_scoring::LiquidationModel;
    ///
    /// let assessment = LiquidationModel::new().assess(2.0, 1.1, 0.60, 7.0).unwrap();
    /// assert!(assessment.probability > 0.0 && assessment.probability < 1e-3);
    /// ```
    pub fn assess(
        &self,
        current_ratio: f64,
        liquidation_ratio: f64,
        volatility: f64,
        days: f64,
    ) -> Result<LiquidationAssessment, LiquidationError> {
        if !current_ratio.is_finite()
            || !liquidation_ratio.is_finite()
            || current_ratio <= 0.0
            || liquidation_ratio <= 0.0
        {
            return Err(LiquidationError::InvalidRatio {
                current: current_ratio,
                liquidation: liquidation_ratio,
            });
        }
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(LiquidationError::InvalidVolatility(volatility));
        }
        if !days.is_finite() || days <= 0.0 {
            return Err(LiquidationError::InvalidHorizon(days));
        }

        let t = year_fraction(days);
        let scaled_volatility = (volatility * t.sqrt()).max(MIN_SCALED_VOLATILITY);
        let required_drop = (current_ratio - liquidation_ratio) / current_ratio;

        let band = self.at_threshold_tolerance * liquidation_ratio;
        let at_threshold = (current_ratio - liquidation_ratio).abs() <= band;
        if !at_threshold && current_ratio < liquidation_ratio {
            return Err(LiquidationError::BelowThreshold {
                current: current_ratio,
                liquidation: liquidation_ratio,
            });
        }

        let drift = -0.5 * volatility * volatility * t;
        let z_score = ((1.0 - required_drop).ln() - drift) / scaled_volatility;
        let mut probability = normal_cdf(z_score);

        if at_threshold {
            probability = probability.max(self.at_threshold_probability);
            debug!(
                current_ratio,
                liquidation_ratio,
                probability,
                "Position at liquidation threshold"
            );
        }

        Ok(LiquidationAssessment {
            probability,
            required_drop,
            z_score,
            scaled_volatility,
            at_threshold,
            days,
        })
    }

    /// Assesses one position over several horizons, in the order given.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid horizon, or on any error [`Self::assess`]
    /// would return.
    pub fn assess_horizons(
        &self,
        current_ratio: f64,
        liquidation_ratio: f64,
        volatility: f64,
        horizons: &[f64],
    ) -> Result<Vec<LiquidationAssessment>, LiquidationError> {
        horizons
            .iter()
            .map(|&days| self.assess(current_ratio, liquidation_ratio, volatility, days))
            .collect()
    }
}

/// Liquidation probability with the default at-threshold policy.
///
/// # Errors
///
/// See [`LiquidationModel::assess`].
pub fn liquidation_probability(
    current_ratio: f64,
    liquidation_ratio: f64,
    volatility: f64,
    days: f64,
) -> Result<f64, LiquidationError> {
    LiquidationModel::new()
        .assess(current_ratio, liquidation_ratio, volatility, days)
        .map(|a| a.probability)
}
