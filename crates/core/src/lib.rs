//! Core types, configuration and numeric helpers for the yield risk engine.

pub mod config;
pub mod config_loader;
pub mod error;
pub mod pool;
pub mod series;
pub mod stats;
pub mod traits;

pub use config::{CollateralConfig, EngineConfig, EnsembleWeights, LiquidationBasis};
pub use config_loader::ConfigLoader;
pub use error::{ConfigError, FeedError, LiquidationError, SeriesError};
pub use pool::{PoolRecord, ScoreComponents, ScoredPool, VolatilitySource};
pub use series::{PricePoint, PriceSeries};
pub use traits::MarketDataSource;
