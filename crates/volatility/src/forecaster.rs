//! Fixed-weight ensemble volatility forecast.
//!
//! Five annualized estimates are blended:
//!
//! | component        | source                                  |
//! |------------------|-----------------------------------------|
//! | historical       | sample volatility of the full history   |
//! | recent_30_day    | sample volatility of the last 30 returns|
//! | ewma             | exponentially weighted volatility       |
//! | regime_adjusted  | ewma × regime risk multiplier           |
//! | macro_adjusted   | regime_adjusted × calendar multiplier   |
//!
//! The weights come from [`EnsembleWeights`] and are validated to sum to one
//! by [`EngineConfig::validate`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use yield_risk_core::stats::year_fraction;
use yield_risk_core::{ConfigError, EngineConfig, EnsembleWeights, PriceSeries};

use crate::calendar::MacroCalendar;
use crate::estimator::{VolatilityEstimator, VolatilityMetrics};
use crate::regime::{MarketRegime, Regime, RegimeDetector};

const BASE_CONFIDENCE: f64 = 0.7;
const MIN_CONFIDENCE: f64 = 0.4;
const MAX_CONFIDENCE: f64 = 0.9;
/// Vol-of-vol above this lowers confidence.
const UNSTABLE_VOL_OF_VOL: f64 = 0.02;
/// Historical and recent volatility closer than this raise confidence.
const CONSISTENT_VOL_GAP: f64 = 0.05;

/// The five unweighted inputs of the ensemble, annualized.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastComponents {
    pub historical: f64,
    pub recent_30_day: f64,
    pub ewma: f64,
    pub regime_adjusted: f64,
    pub macro_adjusted: f64,
}

impl ForecastComponents {
    /// Weighted sum of the components.
    #[must_use]
    pub fn blend(&self, weights: &EnsembleWeights) -> f64 {
        self.historical * weights.historical
            + self.recent_30_day * weights.recent_30_day
            + self.ewma * weights.ewma
            + self.regime_adjusted * weights.regime_adjusted
            + self.macro_adjusted * weights.macro_adjusted
    }
}

/// Annualized ensemble volatility forecast for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityForecast {
    /// Annualized decimal volatility (0.25 = 25%).
    pub ensemble_vol: f64,
    pub components: ForecastComponents,
    pub regime: MarketRegime,
    pub macro_multiplier: f64,
    /// Diagnostic confidence in [0.4, 0.9]. Never used for ranking.
    pub confidence: f64,
    pub metrics: VolatilityMetrics,
}

impl VolatilityForecast {
    /// Forecast scaled to a horizon in days.
    #[must_use]
    pub fn for_horizon(&self, days: f64) -> f64 {
        scale_to_horizon(self.ensemble_vol, days)
    }

    /// Ensemble volatility in percentage points, the unit of `PoolRecord::volatility`.
    #[must_use]
    pub fn as_percentage_points(&self) -> f64 {
        self.ensemble_vol * 100.0
    }

    /// True when the underlying history was too short to forecast from.
    #[must_use]
    pub fn is_insufficient(&self) -> bool {
        self.metrics.is_insufficient()
    }
}

/// Scales an annualized volatility to `days` by the square-root-of-time rule.
///
/// # Examples
///
/// ```
/// use yield_risk_volatility::scale_to_horizon;
///
/// let weekly = scale_to_horizon(0.5, 7.0);
/// assert!((weekly - 0.5 * (7.0_f64 / 365.0).sqrt()).abs() < 1e-12);
/// ```
#[must_use]
pub fn scale_to_horizon(annual_vol: f64, days: f64) -> f64 {
    annual_vol * year_fraction(days.max(0.0)).sqrt()
}

/// Diagnostic confidence of a forecast.
#[must_use]
pub fn confidence_score(metrics: &VolatilityMetrics, regime: Regime) -> f64 {
    let mut confidence = BASE_CONFIDENCE;

    match regime {
        Regime::High => confidence -= 0.2,
        Regime::Elevated => confidence -= 0.1,
        Regime::Low | Regime::Normal => {}
    }

    if metrics.volatility_of_volatility > UNSTABLE_VOL_OF_VOL {
        confidence -= 0.1;
    }

    if (metrics.historical_vol - metrics.recent_30_day_vol).abs() < CONSISTENT_VOL_GAP {
        confidence += 0.1;
    }

    confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

/// Builds ensemble forecasts from price histories.
#[derive(Debug, Clone)]
pub struct VolatilityForecaster {
    estimator: VolatilityEstimator,
    detector: RegimeDetector,
    calendar: MacroCalendar,
    weights: EnsembleWeights,
}

impl Default for VolatilityForecaster {
    fn default() -> Self {
        Self {
            estimator: VolatilityEstimator::new(),
            detector: RegimeDetector::new(),
            calendar: MacroCalendar::default(),
            weights: EnsembleWeights::default(),
        }
    }
}

impl VolatilityForecaster {
    /// Builds a forecaster from the EWMA settings and ensemble weights of a
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration fails validation.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            estimator: VolatilityEstimator::from_config(config)?,
            weights: config.ensemble_weights,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_detector(mut self, detector: RegimeDetector) -> Self {
        self.detector = detector;
        self
    }

    #[must_use]
    pub fn with_calendar(mut self, calendar: MacroCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Forecasts annualized volatility for a price history as of `as_of`.
    #[must_use]
    pub fn forecast(&self, series: &PriceSeries, as_of: DateTime<Utc>) -> VolatilityForecast {
        let returns = series.log_returns();
        let metrics = self.estimator.estimate_returns(&returns);
        let regime = self.detector.detect(&returns);
        let macro_multiplier = self.calendar.multiplier(as_of);

        let forecast = self.combine(metrics, regime, macro_multiplier);
        debug!(
            ensemble_vol = forecast.ensemble_vol,
            regime = %forecast.regime.regime,
            confidence = forecast.confidence,
            samples = metrics.sample_size,
            "Built volatility forecast"
        );
        forecast
    }

    /// Forecasts as of the last observation, or `fallback` for an empty series.
    #[must_use]
    pub fn forecast_latest(
        &self,
        series: &PriceSeries,
        fallback: DateTime<Utc>,
    ) -> VolatilityForecast {
        self.forecast(series, series.last_timestamp().unwrap_or(fallback))
    }

    /// Blends precomputed metrics, regime and calendar multiplier.
    #[must_use]
    pub fn combine(
        &self,
        metrics: VolatilityMetrics,
        regime: MarketRegime,
        macro_multiplier: f64,
    ) -> VolatilityForecast {
        let regime_adjusted = metrics.ewma_vol * regime.risk_multiplier;
        let components = ForecastComponents {
            historical: metrics.historical_vol,
            recent_30_day: metrics.recent_30_day_vol,
            ewma: metrics.ewma_vol,
            regime_adjusted,
            macro_adjusted: regime_adjusted * macro_multiplier,
        };

        VolatilityForecast {
            ensemble_vol: components.blend(&self.weights),
            components,
            regime,
            macro_multiplier,
            confidence: confidence_score(&metrics, regime.regime),
            metrics,
        }
    }
}
