use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Every tunable assumption of an analysis run.
///
/// Passed explicitly into each pipeline call so that concurrent analyses
/// with different assumptions never share state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Analysis horizon in days (Δ).
    pub horizon_days: u32,
    /// Annual benchmark rate as a decimal fraction (0.03 = 3%).
    pub baseline_apr: f64,
    /// Flat liquidation probability, interpreted per `liquidation_basis`.
    pub liquidation_probability: f64,
    pub liquidation_basis: LiquidationBasis,
    /// Fraction of the position lost on a forced unwind.
    pub emergency_haircut: f64,
    /// Correlation of pool returns with the reference portfolio.
    pub assumed_correlation: f64,
    /// Floor for horizon downside volatility in the score denominator (ε).
    pub volatility_floor: f64,
    /// EWMA decay (λ).
    pub decay_factor: f64,
    /// EWMA seed as a daily volatility. `None` seeds with historical daily volatility.
    pub ewma_seed: Option<f64>,
    /// Probability reported when a position sits on its liquidation ratio.
    pub at_threshold_probability: f64,
    /// Relative band around the liquidation ratio treated as "at threshold".
    pub at_threshold_tolerance: f64,
    pub ensemble_weights: EnsembleWeights,
    /// When set, the liquidation model replaces the flat probability.
    pub collateral: Option<CollateralConfig>,
    /// Rows shown by the reporter.
    pub top_n: usize,
}

/// How the flat `liquidation_probability` maps onto the analysis horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidationBasis {
    /// Probability per year, compounded down to the horizon.
    #[default]
    Annual,
    /// Probability within the horizon, applied unchanged.
    Horizon,
}

/// Fixed weights of the ensemble volatility forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleWeights {
    pub historical: f64,
    pub recent_30_day: f64,
    pub ewma: f64,
    pub regime_adjusted: f64,
    pub macro_adjusted: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            historical: 0.10,
            recent_30_day: 0.20,
            ewma: 0.30,
            regime_adjusted: 0.25,
            macro_adjusted: 0.15,
        }
    }
}

impl EnsembleWeights {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.historical + self.recent_30_day + self.ewma + self.regime_adjusted + self.macro_adjusted
    }

    fn as_array(&self) -> [(&'static str, f64); 5] {
        [
            ("ensemble_weights.historical", self.historical),
            ("ensemble_weights.recent_30_day", self.recent_30_day),
            ("ensemble_weights.ewma", self.ewma),
            ("ensemble_weights.regime_adjusted", self.regime_adjusted),
            ("ensemble_weights.macro_adjusted", self.macro_adjusted),
        ]
    }
}

/// A live borrowing position read from chain by an external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollateralConfig {
    /// Current collateral-to-debt ratio (2.0 = 200%).
    pub current_ratio: f64,
    /// Ratio below which the position is liquidated (1.1 = 110%).
    pub liquidation_ratio: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon_days: 7,
            baseline_apr: 0.03,
            liquidation_probability: 0.005,
            liquidation_basis: LiquidationBasis::Annual,
            emergency_haircut: 0.4,
            assumed_correlation: 0.3,
            volatility_floor: 0.001,
            decay_factor: 0.94,
            ewma_seed: None,
            at_threshold_probability: 0.5,
            at_threshold_tolerance: 0.001,
            ensemble_weights: EnsembleWeights::default(),
            collateral: None,
            top_n: 10,
        }
    }
}

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

impl EngineConfig {
    /// Checks every field for structural validity.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon_days == 0 {
            return Err(ConfigError::NonPositiveHorizon);
        }

        finite("baseline_apr", self.baseline_apr)?;
        if self.baseline_apr <= -1.0 {
            return Err(ConfigError::OutOfRange {
                field: "baseline_apr",
                value: self.baseline_apr,
                min: -1.0,
                max: f64::INFINITY,
            });
        }

        within("liquidation_probability", self.liquidation_probability, 0.0, 1.0)?;
        within("emergency_haircut", self.emergency_haircut, 0.0, 1.0)?;
        within("assumed_correlation", self.assumed_correlation, -1.0, 1.0)?;
        within("at_threshold_probability", self.at_threshold_probability, 0.0, 1.0)?;
        within("at_threshold_tolerance", self.at_threshold_tolerance, 0.0, 0.5)?;

        finite("volatility_floor", self.volatility_floor)?;
        if self.volatility_floor <= 0.0 {
            return Err(ConfigError::NonPositiveVolatilityFloor(self.volatility_floor));
        }

        finite("decay_factor", self.decay_factor)?;
        if self.decay_factor <= 0.0 || self.decay_factor >= 1.0 {
            return Err(ConfigError::InvalidDecayFactor(self.decay_factor));
        }

        if let Some(seed) = self.ewma_seed {
            within("ewma_seed", seed, 0.0, f64::MAX)?;
        }

        for (field, weight) in self.ensemble_weights.as_array() {
            within(field, weight, 0.0, 1.0)?;
        }
        let total = self.ensemble_weights.total();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightsDoNotSumToOne(total));
        }

        if let Some(collateral) = self.collateral {
            finite("collateral.current_ratio", collateral.current_ratio)?;
            finite("collateral.liquidation_ratio", collateral.liquidation_ratio)?;
            if collateral.liquidation_ratio <= 0.0
                || collateral.current_ratio <= collateral.liquidation_ratio
            {
                return Err(ConfigError::UnsafeCollateral {
                    current: collateral.current_ratio,
                    liquidation: collateral.liquidation_ratio,
                });
            }
        }

        if self.top_n == 0 {
            return Err(ConfigError::ZeroTopN);
        }

        Ok(())
    }

    /// Returns a copy with a different horizon.
    #[must_use]
    pub fn with_horizon(mut self, horizon_days: u32) -> Self {
        self.horizon_days = horizon_days;
        self
    }

    /// Horizon as a floating-point day count.
    #[must_use]
    pub fn horizon(&self) -> f64 {
        f64::from(self.horizon_days)
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

fn within(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn default_weights_sum_to_one() {
        let total = EnsembleWeights::default().total();
        assert!((total - 1.0).abs() < 1e-12, "total was {total}");
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let config = EngineConfig::default().with_horizon(0);
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveHorizon));
    }

    #[test]
    fn correlation_outside_unit_interval_is_rejected() {
        let config = EngineConfig {
            assumed_correlation: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "assumed_correlation",
                ..
            })
        ));
    }

    #[test]
    fn negative_correlation_is_allowed() {
        let config = EngineConfig {
            assumed_correlation: -0.3,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn decay_factor_bounds() {
        for bad in [0.0, 1.0, -0.2, 1.2] {
            let config = EngineConfig {
                decay_factor: bad,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::InvalidDecayFactor(bad)));
        }
    }

    #[test]
    fn nan_haircut_is_rejected() {
        let config = EngineConfig {
            emergency_haircut: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite {
                field: "emergency_haircut",
                ..
            })
        ));
    }

    #[test]
    fn weights_must_sum_to_one() {
        let config = EngineConfig {
            ensemble_weights: EnsembleWeights {
                historical: 0.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WeightsDoNotSumToOne(_))
        ));
    }

    #[test]
    fn collateral_at_or_below_threshold_is_rejected() {
        let config = EngineConfig {
            collateral: Some(CollateralConfig {
                current_ratio: 1.1,
                liquidation_ratio: 1.1,
            }),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsafeCollateral { .. })
        ));
    }

    #[test]
    fn zero_floor_is_rejected() {
        let config = EngineConfig {
            volatility_floor: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositiveVolatilityFloor(0.0))
        );
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"horizon_days": 30, "liquidation_basis": "horizon"}"#).unwrap();

        assert_eq!(config.horizon_days, 30);
        assert_eq!(config.liquidation_basis, LiquidationBasis::Horizon);
        assert!((config.decay_factor - 0.94).abs() < f64::EPSILON);
        assert!(config.collateral.is_none());
    }
}
