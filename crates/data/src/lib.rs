//! Market data ingestion for the yield risk engine.
//!
//! This crate provides:
//! - Normalization of heterogeneous raw pool records into [`PoolRecord`]s
//! - A file-backed [`MarketDataSource`] for pools (JSON) and price histories (CSV)
//!
//! [`PoolRecord`]: yield_risk_core::PoolRecord
//! [`MarketDataSource`]: yield_risk_core::MarketDataSource

pub mod feed;
pub mod normalizer;

pub use feed::{fetch_histories, parse_pool_document, parse_price_csv, FileMarketData};
pub use normalizer::{
    normalize, normalize_all, resolve_volatility, DropReason, DroppedRecord, NormalizedBatch,
    VolatilityMethod, RESOLUTION_ORDER,
};
