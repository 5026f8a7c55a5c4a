//! Risk-adjusted yield scoring.
//!
//! Converts annual yield, volatility and liquidation risk onto a common
//! horizon and combines them into one comparable score per pool.

pub mod horizon;
pub mod liquidation;
pub mod pipeline;
pub mod score;

pub use horizon::{horizon_liquidation_probability, horizon_return, horizon_volatility};
pub use liquidation::{
    liquidation_probability, LiquidationAssessment, LiquidationModel, MIN_SCALED_VOLATILITY,
};
pub use pipeline::{apply_forecast, score_pools, ScoringSummary};
pub use score::{risk_adjusted_score, score_pool, LiquidationSource, ScoreCalculator};
