//! Typed errors for structurally invalid requests.
//!
//! Per-record problems (a pool without derivable volatility, a series too
//! short for statistics) are not errors; they are reported as drops or as
//! all-zero metrics by the stages that encounter them.

use thiserror::Error;

/// Invalid engine configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("horizon_days must be greater than zero")]
    NonPositiveHorizon,

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must lie within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("decay_factor must lie strictly between 0 and 1, got {0}")]
    InvalidDecayFactor(f64),

    #[error("volatility_floor must be positive, got {0}")]
    NonPositiveVolatilityFloor(f64),

    #[error("ensemble weights must sum to 1.0, got {0}")]
    WeightsDoNotSumToOne(f64),

    #[error("collateral current_ratio {current} is not above liquidation_ratio {liquidation}")]
    UnsafeCollateral { current: f64, liquidation: f64 },

    #[error("top_n must be greater than zero")]
    ZeroTopN,
}

/// Invalid price history.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("price at index {index} must be finite and positive, got {price}")]
    InvalidPrice { index: usize, price: f64 },

    #[error("timestamps must be strictly increasing (index {index})")]
    NotIncreasing { index: usize },
}

/// Invalid liquidation probability request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LiquidationError {
    #[error("collateral ratios must be finite and positive (current {current}, liquidation {liquidation})")]
    InvalidRatio { current: f64, liquidation: f64 },

    #[error("position at ratio {current} is already below liquidation ratio {liquidation}")]
    BelowThreshold { current: f64, liquidation: f64 },

    #[error("volatility must be finite and non-negative, got {0}")]
    InvalidVolatility(f64),

    #[error("horizon must be positive, got {0} days")]
    InvalidHorizon(f64),
}

/// Failure reading from a market-data source.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("no price history for {0}")]
    MissingHistory(String),

    #[error("malformed feed data: {0}")]
    Malformed(String),

    #[error(transparent)]
    Series(#[from] SeriesError),
}
