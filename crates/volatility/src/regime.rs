//! Volatility regime classification.
//!
//! The regime is read from the annualized sample volatility of the most
//! recent returns and carries a risk multiplier that scales the EWMA leg of
//! the ensemble forecast.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use yield_risk_core::stats::{annualize, sample_std_dev};

/// Volatility regime of the recent market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    /// Annualized recent volatility below the low threshold.
    Low,
    Normal,
    /// Above the elevated threshold but not high.
    Elevated,
    /// Annualized recent volatility above the high threshold.
    High,
}

impl Regime {
    /// Multiplier applied to the EWMA volatility in this regime.
    #[must_use]
    pub fn risk_multiplier(self) -> f64 {
        match self {
            Self::Low => 0.9,
            Self::Normal => 1.0,
            Self::Elevated => 1.1,
            Self::High => 1.3,
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "LOW",
            Self::Normal => "NORMAL",
            Self::Elevated => "ELEVATED",
            Self::High => "HIGH",
        };
        f.write_str(label)
    }
}

/// A classified regime together with the volatility it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketRegime {
    pub regime: Regime,
    pub risk_multiplier: f64,
    /// Annualized sample volatility of the lookback window.
    pub annualized_recent_vol: f64,
}

impl MarketRegime {
    #[must_use]
    pub fn new(regime: Regime, annualized_recent_vol: f64) -> Self {
        Self {
            regime,
            risk_multiplier: regime.risk_multiplier(),
            annualized_recent_vol,
        }
    }
}

/// Thresholds for regime classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeConfig {
    /// Number of most recent returns inspected (default: 20).
    pub lookback: usize,
    /// Strictly above this is High (default: 0.8).
    pub high_threshold: f64,
    /// Strictly above this is Elevated (default: 0.6).
    pub elevated_threshold: f64,
    /// Strictly below this is Low (default: 0.4).
    pub low_threshold: f64,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            high_threshold: 0.8,
            elevated_threshold: 0.6,
            low_threshold: 0.4,
        }
    }
}

/// Classifies the recent volatility regime of a price history.
#[derive(Debug, Clone, Default)]
pub struct RegimeDetector {
    config: RegimeConfig,
}

impl RegimeDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: RegimeConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RegimeConfig {
        &self.config
    }

    /// Maps an annualized volatility onto a regime.
    #[must_use]
    pub fn classify(&self, annualized_vol: f64) -> Regime {
        if annualized_vol > self.config.high_threshold {
            Regime::High
        } else if annualized_vol > self.config.elevated_threshold {
            Regime::Elevated
        } else if annualized_vol < self.config.low_threshold {
            Regime::Low
        } else {
            Regime::Normal
        }
    }

    /// Detects the regime from daily log returns.
    ///
    /// With fewer than two returns in the window the regime is Normal, so an
    /// empty history neither dampens nor inflates the forecast.
    #[must_use]
    pub fn detect(&self, returns: &[f64]) -> MarketRegime {
        let window = &returns[returns.len().saturating_sub(self.config.lookback)..];
        if window.len() < 2 {
            debug!(returns = window.len(), "Too few returns for regime detection");
            return MarketRegime::new(Regime::Normal, 0.0);
        }

        let annualized = annualize(sample_std_dev(window));
        MarketRegime::new(self.classify(annualized), annualized)
    }
}
