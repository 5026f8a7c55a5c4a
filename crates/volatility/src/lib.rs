//! Volatility estimation and forecasting from price histories.
//!
//! - [`VolatilityEstimator`]: historical, recent, EWMA and vol-of-vol statistics
//! - [`RegimeDetector`]: LOW / NORMAL / ELEVATED / HIGH from recent returns
//! - [`MacroCalendar`]: weekend and month-end multipliers
//! - [`VolatilityForecaster`]: fixed-weight ensemble with diagnostic confidence

pub mod calendar;
pub mod estimator;
pub mod forecaster;
pub mod regime;

pub use calendar::MacroCalendar;
pub use estimator::{
    rolling_volatilities, volatility_of_volatility, VolatilityEstimator, VolatilityMetrics,
};
pub use forecaster::{
    confidence_score, scale_to_horizon, ForecastComponents, VolatilityForecast,
    VolatilityForecaster,
};
pub use regime::{MarketRegime, Regime, RegimeConfig, RegimeDetector};
