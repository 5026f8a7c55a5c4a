//! CLI commands for the yield risk engine.

mod config;
pub mod forecast;
pub mod liquidation;
pub mod score;

pub use forecast::{run_forecast, ForecastArgs};
pub use liquidation::{run_liquidation, LiquidationArgs};
pub use score::{run_score, ScoreArgs};
