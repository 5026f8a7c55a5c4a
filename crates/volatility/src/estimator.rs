//! Realized volatility statistics from a price history.
//!
//! All statistics use sample variance (`n − 1`). Annualization uses 365
//! days. A series with fewer than two prices produces all-zero metrics,
//! which callers must read as "insufficient data" rather than as a calm
//! market.

use serde::{Deserialize, Serialize};
use yield_risk_core::stats::{annualize, mean, sample_std_dev};
use yield_risk_core::{ConfigError, EngineConfig, PriceSeries};

/// Number of most recent returns used for the recent volatility.
pub const RECENT_WINDOW: usize = 30;
/// Window of the rolling realized volatilities behind volatility-of-volatility.
pub const VOL_OF_VOL_WINDOW: usize = 10;
/// Default EWMA decay (RiskMetrics daily λ).
pub const DEFAULT_DECAY_FACTOR: f64 = 0.94;
/// Returns needed before the statistics are considered meaningful.
pub const RELIABLE_SAMPLE_SIZE: usize = 30;

/// Volatility statistics of one price history.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VolatilityMetrics {
    /// Sample volatility of all returns, annualized.
    pub historical_vol: f64,
    /// Sample volatility of the last 30 returns, annualized.
    pub recent_30_day_vol: f64,
    /// Exponentially weighted volatility, annualized.
    pub ewma_vol: f64,
    /// Dispersion of rolling 10-return realized volatilities (daily units).
    pub volatility_of_volatility: f64,
    /// Sample volatility of all returns, not annualized.
    pub daily_volatility: f64,
    /// Mean daily log return.
    pub mean_return: f64,
    /// Number of returns the statistics were computed from.
    pub sample_size: usize,
}

impl VolatilityMetrics {
    /// Returns true when there were too few returns for any dispersion statistic.
    #[must_use]
    pub fn is_insufficient(&self) -> bool {
        self.sample_size < 2
    }

    /// Returns true when the sample is large enough to trust.
    #[must_use]
    pub fn is_reliable(&self) -> bool {
        self.sample_size >= RELIABLE_SAMPLE_SIZE
    }
}

/// Computes [`VolatilityMetrics`] with a configurable EWMA.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityEstimator {
    decay_factor: f64,
    /// Initial daily volatility of the EWMA recursion.
    ewma_seed: Option<f64>,
}

impl Default for VolatilityEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl VolatilityEstimator {
    /// Creates an estimator with λ = 0.94, seeded from historical volatility.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            decay_factor: DEFAULT_DECAY_FACTOR,
            ewma_seed: None,
        }
    }

    /// Creates an estimator from the EWMA settings of an engine configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration fails validation.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            decay_factor: config.decay_factor,
            ewma_seed: config.ewma_seed,
        })
    }

    /// Seeds the EWMA with an explicit daily volatility.
    #[must_use]
    pub fn with_seed(mut self, daily_volatility: f64) -> Self {
        self.ewma_seed = Some(daily_volatility);
        self
    }

    #[must_use]
    pub fn decay_factor(&self) -> f64 {
        self.decay_factor
    }

    /// Computes all metrics for a price history.
    #[must_use]
    pub fn estimate(&self, series: &PriceSeries) -> VolatilityMetrics {
        self.estimate_returns(&series.log_returns())
    }

    /// Computes all metrics from precomputed log returns.
    #[must_use]
    pub fn estimate_returns(&self, returns: &[f64]) -> VolatilityMetrics {
        if returns.is_empty() {
            return VolatilityMetrics::default();
        }

        let daily_volatility = sample_std_dev(returns);
        let recent = &returns[returns.len().saturating_sub(RECENT_WINDOW)..];
        let seed = self.ewma_seed.unwrap_or(daily_volatility);

        VolatilityMetrics {
            historical_vol: annualize(daily_volatility),
            recent_30_day_vol: annualize(sample_std_dev(recent)),
            ewma_vol: annualize(self.ewma_daily(returns, seed)),
            volatility_of_volatility: volatility_of_volatility(returns),
            daily_volatility,
            mean_return: mean(returns),
            sample_size: returns.len(),
        }
    }

    /// Runs `σ²_t = λσ²_{t−1} + (1−λ)r_t²` over all returns; returns daily σ.
    #[must_use]
    pub fn ewma_daily(&self, returns: &[f64], seed_daily: f64) -> f64 {
        let lambda = self.decay_factor;
        returns
            .iter()
            .fold(seed_daily * seed_daily, |variance, r| {
                lambda * variance + (1.0 - lambda) * r * r
            })
            .sqrt()
    }
}

/// Sample volatility of each full rolling window of returns.
#[must_use]
pub fn rolling_volatilities(returns: &[f64], window: usize) -> Vec<f64> {
    if window < 2 || returns.len() < window {
        return Vec::new();
    }
    returns.windows(window).map(sample_std_dev).collect()
}

/// Sample standard deviation of the rolling 10-return realized volatilities.
///
/// Returns 0.0 when fewer than two full windows exist.
#[must_use]
pub fn volatility_of_volatility(returns: &[f64]) -> f64 {
    sample_std_dev(&rolling_volatilities(returns, VOL_OF_VOL_WINDOW))
}
